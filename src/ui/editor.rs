// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Applies key actions to a session.

use crate::arrangement::{MeasureId, MeasureUpdate, Rhythm};
use crate::audio::{AudioError, VoiceEngine};
use crate::sequencer::Sequencer;

use super::KeyAction;

/// Editing cursor over the timeline
#[derive(Debug, Clone, Default)]
pub struct Editor {
    selected: usize,
}

/// Next rhythm toward more (`faster`) or fewer strums, saturating at the ends
fn shift_rhythm(rhythm: Rhythm, faster: bool) -> Rhythm {
    let index = Rhythm::ALL.iter().position(|&r| r == rhythm).unwrap_or(0);
    let index = if faster {
        (index + 1).min(Rhythm::ALL.len() - 1)
    } else {
        index.saturating_sub(1)
    };
    Rhythm::ALL[index]
}

impl Editor {
    /// Index of the measure being edited
    pub fn selected(&self) -> usize {
        self.selected
    }

    fn clamp<V: VoiceEngine>(&mut self, seq: &Sequencer<V>) {
        self.selected = self.selected.min(seq.measures().len().saturating_sub(1));
    }

    fn selected_id<V: VoiceEngine>(&mut self, seq: &Sequencer<V>) -> Option<MeasureId> {
        self.clamp(seq);
        seq.measures().get(self.selected).map(|m| m.id)
    }

    /// Apply `action`, returning a status line worth showing
    pub async fn apply<V: VoiceEngine>(
        &mut self,
        seq: &mut Sequencer<V>,
        action: KeyAction,
    ) -> Result<Option<String>, AudioError> {
        let status = match action {
            KeyAction::TogglePlay => {
                seq.toggle_play().await?;
                None
            }
            KeyAction::Stop => {
                seq.stop();
                None
            }
            KeyAction::Tempo(delta) => {
                let target = (seq.bpm() as i32 + delta).clamp(0, u16::MAX as i32) as u16;
                let bpm = seq.set_bpm(target);
                Some(format!("Tempo {bpm} BPM"))
            }
            KeyAction::ToggleLoop => {
                seq.set_looping(!seq.is_looping());
                None
            }
            KeyAction::AddMeasure => {
                seq.add_measure();
                self.selected = seq.measures().len() - 1;
                None
            }
            KeyAction::RemoveMeasure => {
                let removed = match self.selected_id(seq) {
                    Some(id) => seq.remove_measure(id),
                    None => false,
                };
                self.clamp(seq);
                (!removed).then(|| "The timeline keeps at least one measure".to_string())
            }
            KeyAction::SelectPrev => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyAction::SelectNext => {
                self.selected += 1;
                self.clamp(seq);
                None
            }
            KeyAction::SetChord(index) => {
                if let Some(id) = self.selected_id(seq) {
                    seq.update_measure(id, MeasureUpdate::Chord(Some(index)));
                }
                None
            }
            KeyAction::SetRest => {
                if let Some(id) = self.selected_id(seq) {
                    seq.update_measure(id, MeasureUpdate::Chord(None));
                }
                None
            }
            KeyAction::RhythmFaster | KeyAction::RhythmSlower => {
                let faster = action == KeyAction::RhythmFaster;
                self.clamp(seq);
                let current = seq.measures().get(self.selected).copied();
                if let Some(measure) = current {
                    let rhythm = shift_rhythm(measure.rhythm, faster);
                    seq.update_measure(measure.id, MeasureUpdate::Rhythm(rhythm));
                }
                None
            }
            KeyAction::NextRoot | KeyAction::PrevRoot => {
                let step = if action == KeyAction::NextRoot { 1 } else { 11 };
                let root = seq.chords().root().transpose(step);
                seq.set_root(root);
                Some(format!("Key {} {}", root, seq.chords().mode()))
            }
            KeyAction::ToggleMode => {
                let mode = seq.chords().mode().parallel();
                seq.set_scale(mode);
                Some(format!("Key {} {}", seq.chords().root(), mode))
            }
            KeyAction::Preview => {
                self.clamp(seq);
                match seq.measures().get(self.selected).and_then(|m| m.chord_index) {
                    Some(index) if seq.preview_degree(index) => None,
                    Some(_) => Some("No such chord in this key".to_string()),
                    None => Some("Rest".to_string()),
                }
            }
            KeyAction::Clear => {
                seq.reset_timeline();
                self.selected = 0;
                Some("Timeline cleared".to_string())
            }
            KeyAction::None | KeyAction::Quit | KeyAction::ToggleHelp => None,
        };
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::audio::TraceVoice;
    use crate::config::SessionConfig;
    use crate::music::{Note, ScaleMode};
    use crate::timing::ManualClock;

    fn session() -> Sequencer<TraceVoice> {
        Sequencer::new(
            TraceVoice::new(),
            Arc::new(ManualClock::new()),
            &SessionConfig::default(),
        )
    }

    #[test]
    fn test_shift_rhythm_saturates() {
        assert_eq!(shift_rhythm(Rhythm::Quarter, true), Rhythm::Eighth);
        assert_eq!(shift_rhythm(Rhythm::Quarter, false), Rhythm::Half);
        assert_eq!(shift_rhythm(Rhythm::Sixteenth, true), Rhythm::Sixteenth);
        assert_eq!(shift_rhythm(Rhythm::Whole, false), Rhythm::Whole);
    }

    #[tokio::test]
    async fn test_edit_selected_measure() {
        let mut seq = session();
        let mut editor = Editor::default();

        editor.apply(&mut seq, KeyAction::AddMeasure).await.unwrap();
        assert_eq!(editor.selected(), 1);
        editor.apply(&mut seq, KeyAction::SetChord(3)).await.unwrap();
        editor.apply(&mut seq, KeyAction::RhythmSlower).await.unwrap();

        let measure = seq.measures()[1];
        assert_eq!(measure.chord_index, Some(3));
        assert_eq!(measure.rhythm, Rhythm::Half);
        assert!(seq.measures()[0].is_rest());
    }

    #[tokio::test]
    async fn test_remove_last_measure_reports() {
        let mut seq = session();
        let mut editor = Editor::default();
        let status = editor.apply(&mut seq, KeyAction::RemoveMeasure).await.unwrap();
        assert!(status.is_some());
        assert_eq!(seq.measures().len(), 1);
    }

    #[tokio::test]
    async fn test_key_changes() {
        let mut seq = session();
        let mut editor = Editor::default();
        editor.apply(&mut seq, KeyAction::PrevRoot).await.unwrap();
        assert_eq!(seq.chords().root(), Note::B);
        editor.apply(&mut seq, KeyAction::ToggleMode).await.unwrap();
        assert_eq!(seq.chords().mode(), ScaleMode::Minor);
        assert_eq!(seq.chords().get(0).map(|c| c.name.as_str()), Some("Bm"));
    }

    #[tokio::test]
    async fn test_loop_and_tempo() {
        let mut seq = session();
        let mut editor = Editor::default();

        assert!(seq.is_looping());
        editor.apply(&mut seq, KeyAction::ToggleLoop).await.unwrap();
        assert!(!seq.is_looping());

        let status = editor.apply(&mut seq, KeyAction::Tempo(-100)).await.unwrap();
        assert_eq!(seq.bpm(), 40);
        assert_eq!(status.as_deref(), Some("Tempo 40 BPM"));
        editor.apply(&mut seq, KeyAction::Tempo(10)).await.unwrap();
        assert_eq!(seq.bpm(), 50);
    }

    #[tokio::test]
    async fn test_toggle_play_and_preview() {
        let mut seq = session();
        let mut editor = Editor::default();
        editor.apply(&mut seq, KeyAction::SetChord(0)).await.unwrap();

        editor.apply(&mut seq, KeyAction::TogglePlay).await.unwrap();
        assert!(seq.is_playing());
        editor.apply(&mut seq, KeyAction::TogglePlay).await.unwrap();
        assert!(!seq.is_playing());

        let before = seq.voice().triggered();
        editor.apply(&mut seq, KeyAction::Preview).await.unwrap();
        assert_eq!(seq.voice().triggered(), before + 3);
    }
}
