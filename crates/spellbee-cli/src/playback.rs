//! Local audio playback for terminal play.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, Sink};

/// Play an audio file to the default output device, blocking until done.
///
/// rodio's `OutputStream` is `!Send`, so each call opens its own stream on
/// the calling thread. Run it via `spawn_blocking` from async code.
pub fn play_file(path: &Path) -> Result<(), String> {
    let (_stream, handle) =
        OutputStream::try_default().map_err(|e| format!("failed to open audio output: {e}"))?;
    let sink = Sink::try_new(&handle).map_err(|e| format!("failed to create sink: {e}"))?;

    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| format!("failed to decode {}: {e}", path.display()))?;

    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}
