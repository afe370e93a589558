//! MIDI input: the driver thread parses messages and queues them for the input loop.

use color_eyre::eyre::{eyre, Result as EyreResult};
use midir::{Ignore, MidiInput, MidiInputConnection};
use rtrb::Producer;
use tracing::{info, warn};

use luna::controller::MidiEvent;

/// Connect to input port `port` (the first port when `None`).
pub fn connect(
    port: Option<usize>,
    mut events: Producer<MidiEvent>,
) -> EyreResult<MidiInputConnection<()>> {
    let mut input =
        MidiInput::new("luna").map_err(|e| eyre!("failed to create MIDI input: {}", e))?;
    input.ignore(Ignore::All);

    let ports = input.ports();
    for (index, p) in ports.iter().enumerate() {
        let name = input
            .port_name(p)
            .unwrap_or_else(|_| format!("Unknown Device {}", index));
        info!(index, %name, "midi input port");
    }

    let index = port.unwrap_or(0);
    let selected = ports
        .get(index)
        .ok_or_else(|| eyre!("midi port {} not found ({} available)", index, ports.len()))?;
    let name = input
        .port_name(selected)
        .unwrap_or_else(|_| format!("Device {}", index));

    let connection = input
        .connect(
            selected,
            "luna-midi-in",
            move |_timestamp, message, _| {
                let Some(event) = MidiEvent::parse(message) else {
                    return;
                };
                if events.push(event).is_err() {
                    warn!(?event, "midi queue full, dropping event");
                }
            },
            (),
        )
        .map_err(|e| eyre!("failed to connect to MIDI device {}: {}", name, e))?;

    info!(%name, "connected midi input");
    Ok(connection)
}
