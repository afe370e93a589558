//! Terminal input loop: computer keyboard notes, MIDI draining, live parameters.

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use rtrb::Consumer;
use std::io::stdout;
use std::time::Duration;
use tracing::{info, warn};

use luna::{
    clock::FrameClock,
    config::ControllerKind,
    controller::{with_instrument, Controller, KeyboardController, MidiController, MidiEvent, SharedInstrument},
    dsp::Waveform,
    synth::AudioParam,
};

const POLL_INTERVAL: Duration = Duration::from_millis(5);
const GAIN_STEP: f64 = 0.05;
const CUTOFF_STEP: f64 = 1.25;

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    instrument: SharedInstrument<FrameClock>,
    keyboard: KeyboardController<FrameClock>,
    midi: MidiController<FrameClock>,
    midi_events: Consumer<MidiEvent>,
    active: ControllerKind,
    // Terminals without the kitty protocol never report key release
    key_release: bool,
}

impl Session {
    pub fn new(
        instrument: SharedInstrument<FrameClock>,
        midi_events: Consumer<MidiEvent>,
        active: ControllerKind,
        midi_channel: Option<u8>,
    ) -> Self {
        let mut keyboard = KeyboardController::new();
        let mut midi = MidiController::new(midi_channel);
        match active {
            ControllerKind::Keyboard => keyboard.enable(instrument.clone()),
            ControllerKind::Midi => midi.enable(instrument.clone()),
        }

        Self {
            instrument,
            keyboard,
            midi,
            midi_events,
            active,
            key_release: false,
        }
    }

    pub fn run(&mut self) -> EyreResult<()> {
        println!("=== Luna ===");
        println!("Keys z../ a..' q..\\ play notes, Tab switches keyboard/MIDI");
        println!("F1-F4 waveform, Up/Down master gain, Left/Right filter cutoff, Esc quits");
        println!();

        terminal::enable_raw_mode()?;
        self.key_release = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.key_release {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        } else {
            info!("terminal does not report key release, notes latch until pressed again");
        }

        let result = self.event_loop();

        if self.key_release {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        terminal::disable_raw_mode()?;

        with_instrument(&self.instrument, |synth| synth.stop_all_notes());
        result
    }

    fn event_loop(&mut self) -> EyreResult<()> {
        loop {
            self.midi.drain(&mut self.midi_events);

            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if self.handle_key(key) == Flow::Quit {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if let KeyCode::Char(c) = key.code {
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl && c == 'c' {
                return Flow::Quit;
            }
            if !ctrl && self.active == ControllerKind::Keyboard {
                self.play_key(c, key.kind);
                return Flow::Continue;
            }
        }

        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }

        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Tab => self.switch_controller(),
            KeyCode::F(n @ 1..=4) => {
                let waveform = match n {
                    1 => Waveform::Sine,
                    2 => Waveform::Square,
                    3 => Waveform::Sawtooth,
                    _ => Waveform::Triangle,
                };
                self.update(AudioParam::Waveform(waveform));
            }
            KeyCode::Up | KeyCode::Down => {
                let gain = with_instrument(&self.instrument, |synth| synth.patch().master_gain);
                let step = if key.code == KeyCode::Up { GAIN_STEP } else { -GAIN_STEP };
                self.update(AudioParam::MasterGain((gain + step).clamp(0.0, 1.0)));
            }
            KeyCode::Left | KeyCode::Right => {
                let cutoff = with_instrument(&self.instrument, |synth| synth.patch().filter.cutoff_hz);
                let cutoff = if key.code == KeyCode::Right {
                    cutoff * CUTOFF_STEP
                } else {
                    cutoff / CUTOFF_STEP
                };
                self.update(AudioParam::FilterCutoff(cutoff.clamp(40.0, 18_000.0)));
            }
            _ => {}
        }
        Flow::Continue
    }

    fn play_key(&mut self, c: char, kind: KeyEventKind) {
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat if self.key_release => {
                self.keyboard.key_down(c);
            }
            KeyEventKind::Release => {
                self.keyboard.key_up(c);
            }
            KeyEventKind::Press => {
                let held = luna::controller::note_for_key(c)
                    .is_some_and(|note| self.keyboard.held_notes().any(|n| n == note));
                if held {
                    self.keyboard.key_up(c);
                } else {
                    self.keyboard.key_down(c);
                }
            }
            KeyEventKind::Repeat => {}
        }
    }

    fn switch_controller(&mut self) {
        self.active = match self.active {
            ControllerKind::Keyboard => {
                self.keyboard.disable();
                self.midi.enable(self.instrument.clone());
                ControllerKind::Midi
            }
            ControllerKind::Midi => {
                self.midi.disable();
                self.keyboard.enable(self.instrument.clone());
                ControllerKind::Keyboard
            }
        };
        with_instrument(&self.instrument, |synth| synth.stop_all_notes());
        info!(controller = ?self.active, "switched controller");
    }

    fn update(&self, param: AudioParam) {
        let result = with_instrument(&self.instrument, |synth| synth.update_audio_param(param));
        match result {
            Ok(()) => info!(?param, "updated"),
            Err(err) => warn!(%err, "parameter rejected"),
        }
    }
}
