//! Decoding loop for captured traffic.
//!
//! Every step takes the running [`DumpStats`] by value and returns the
//! updated value, so the loops own their state and nothing is shared.

use std::io::{self, Write};

use bgapi_protocol::{
    decode_command_with, decode_message_with, describe, describe_message, BgApiCodec, CodecError,
    Command, DecodeOptions, DecodedFrame, Event, MessageSet, ProtocolError, Response,
    TECHNOLOGY_BLUETOOTH_SMART,
};
use futures::StreamExt;
use log::{debug, warn};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead};
use tokio_util::codec::FramedRead;

use crate::cli::{Direction, OutputFormat};
use crate::hex::{format_hex, parse_hex_line};

/// How captured frames are interpreted and printed.
#[derive(Debug, Clone, Copy)]
pub struct DumpConfig {
    pub direction: Direction,
    pub output: OutputFormat,
    pub options: DecodeOptions,
}

/// Running totals of one dump.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DumpStats {
    /// Frames handed to the decoder.
    pub frames: u64,
    pub decoded: u64,
    /// Frames or input lines that could not be decoded.
    pub failed: u64,
    /// Frames of another technology type.
    pub skipped: u64,
}

impl DumpStats {
    fn decoded(self) -> Self {
        Self {
            frames: self.frames + 1,
            decoded: self.decoded + 1,
            ..self
        }
    }

    fn failed(self) -> Self {
        Self {
            frames: self.frames + 1,
            failed: self.failed + 1,
            ..self
        }
    }

    fn skipped(self) -> Self {
        Self {
            skipped: self.skipped + 1,
            ..self
        }
    }

    /// Returns true if nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Serialize)]
struct Record<'a> {
    frame: u64,
    bytes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a DecodedFrame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Decode one codec frame for the configured direction.
pub fn decode(frame: &[u8], config: &DumpConfig) -> Result<DecodedFrame, ProtocolError> {
    match config.direction {
        Direction::Device => {
            decode_message_with(frame, &config.options).and_then(|msg| describe_message(&msg))
        }
        Direction::Host => {
            decode_command_with(frame, &config.options).and_then(|cmd| describe(false, &cmd))
        }
    }
}

/// Decode and print one frame.
pub fn process_frame<W: Write>(
    frame: &[u8],
    config: &DumpConfig,
    stats: DumpStats,
    out: &mut W,
) -> io::Result<DumpStats> {
    let index = stats.frames + 1;

    match decode(frame, config) {
        Ok(decoded) => {
            match config.output {
                OutputFormat::Text => writeln!(out, "#{} {}", index, decoded)?,
                OutputFormat::Json => write_record(
                    out,
                    &Record {
                        frame: index,
                        bytes: format_hex(frame),
                        message: Some(&decoded),
                        error: None,
                    },
                )?,
            }
            Ok(stats.decoded())
        }
        Err(e) => {
            warn!("Frame {}: {} [{}]", index, e, format_hex(frame));
            if config.output == OutputFormat::Json {
                write_record(
                    out,
                    &Record {
                        frame: index,
                        bytes: format_hex(frame),
                        message: None,
                        error: Some(e.to_string()),
                    },
                )?;
            }
            Ok(stats.failed())
        }
    }
}

fn write_record<W: Write>(out: &mut W, record: &Record<'_>) -> io::Result<()> {
    serde_json::to_writer(&mut *out, record)?;
    writeln!(out)
}

/// Dump a text capture with one hex encoded codec frame per line.
pub async fn dump_hex<R, W>(reader: R, config: &DumpConfig, out: &mut W) -> io::Result<DumpStats>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();
    let mut stats = DumpStats::default();
    let mut line_no = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        match parse_hex_line(&line) {
            Ok(Some(frame)) => stats = process_frame(&frame, config, stats, out)?,
            Ok(None) => {}
            Err(e) => {
                warn!("Line {}: {}", line_no, e);
                stats = stats.failed();
            }
        }
    }

    Ok(stats)
}

/// Dump a binary serial capture.
pub async fn dump_raw<R, W>(reader: R, config: &DumpConfig, out: &mut W) -> io::Result<DumpStats>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let mut frames = FramedRead::new(reader, BgApiCodec::new());
    let mut stats = DumpStats::default();

    while let Some(item) = frames.next().await {
        let wire = match item {
            Ok(wire) => wire,
            Err(CodecError::Protocol(e)) => {
                // The framer only rejects a frame cut off at end of input.
                warn!("Capture ended inside a frame: {}", e);
                stats = stats.failed();
                break;
            }
            Err(CodecError::Io(e)) => return Err(e),
        };

        if wire.technology != TECHNOLOGY_BLUETOOTH_SMART {
            warn!(
                "Skipping frame of technology type {} [{}]",
                wire.technology,
                format_hex(&wire.frame)
            );
            stats = stats.skipped();
            continue;
        }

        debug!("Wire frame [{}]", format_hex(&wire.frame));
        stats = process_frame(&wire.frame, config, stats, out)?;
    }

    Ok(stats)
}

/// Print every registered layout.
pub fn write_layouts<W: Write>(out: &mut W) -> io::Result<()> {
    let tables = [Command::LAYOUTS, Response::LAYOUTS, Event::LAYOUTS];
    for layout in tables.iter().flat_map(|t| t.iter()) {
        let fields = layout
            .fields
            .iter()
            .map(|f| format!("{}: {}", f.name, f.ty.type_name()))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            out,
            "{:<8} [{:02X}:{:02X}] {} {{ {} }}",
            layout.kind, layout.class, layout.method, layout.name, fields
        )?;
    }
    Ok(())
}
