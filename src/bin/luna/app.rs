//! Luna - audio device setup and the render callback

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

use super::midi_input;
use super::session::Session;

use luna::{
    clock::FrameClock,
    config::Config,
    controller::{with_instrument, MidiEvent, SharedInstrument},
    synth::Instrument,
    MAX_BLOCK_SIZE,
};

/// MIDI events buffered between the driver thread and the input loop.
const MIDI_QUEUE_SIZE: usize = 256;

pub struct Luna {
    config: Config,
}

impl Luna {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Open the audio device, connect MIDI and hand the terminal to the session.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let clock = FrameClock::new(sample_rate);
        let instrument: SharedInstrument<FrameClock> = Arc::new(Mutex::new(
            Instrument::new(clock.clone(), self.config.patch).with_lookahead(self.config.lookahead),
        ));

        info!(sample_rate, channels, lookahead = self.config.lookahead, "audio device ready");

        let render_instrument = instrument.clone();
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                with_instrument(&render_instrument, |synth| {
                    for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                        let frames = chunk.len() / channels;
                        let block = &mut render_buf[..frames];
                        synth.render(block, clock.sample_rate());

                        // Mono to all channels
                        for (frame, &sample) in chunk.chunks_mut(channels).zip(block.iter()) {
                            frame.fill(sample);
                        }
                        clock.advance(frames);
                    }
                });
            },
            |err| error!(%err, "audio stream error"),
            None,
        )?;

        stream.play().wrap_err("failed to start output stream")?;

        let (producer, consumer) = RingBuffer::<MidiEvent>::new(MIDI_QUEUE_SIZE);
        // Keep the connection alive for the whole session
        let _midi_connection = match midi_input::connect(self.config.midi.port, producer) {
            Ok(connection) => Some(connection),
            Err(err) => {
                warn!("midi input unavailable: {}", err);
                None
            }
        };

        Session::new(
            instrument,
            consumer,
            self.config.controller,
            self.config.midi.channel,
        )
        .run()
    }
}
