use std::io::Write;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use storeid::{AtomicGenerator, Gid, IdGenerator, KeysetCursor, LockGenerator, SnowflakeId};

use crate::config::{Command, Config, GeneratorKind};

/// Executes the configured command, writing its output to `out`.
pub fn run<W: Write>(config: &Config, out: &mut W) -> anyhow::Result<()> {
    match &config.command {
        Command::Generate {
            count,
            entity,
            compact,
        } => {
            let generator = build_generator(config)?;
            tracing::debug!(count, machine_tag = generator.machine_tag(), "generating ids");
            for _ in 0..*count {
                let raw = generator.generate();
                match entity.map(|entity| Gid::new(entity, raw)) {
                    Some(gid) if *compact => writeln!(out, "{}", gid.to_compact())?,
                    Some(gid) => writeln!(out, "{gid}")?,
                    None => writeln!(out, "{raw}")?,
                }
            }
        }
        Command::Inspect(id) => inspect(*id, out)?,
        Command::Gid(gid) => {
            writeln!(out, "entity_type: {}", gid.entity_type())?;
            writeln!(out, "id:          {}", gid.id())?;
            writeln!(out, "canonical:   {}", gid.to_canonical())?;
            writeln!(out, "compact:     {}", gid.to_compact())?;
        }
        Command::EncodeCursor(cursor) => {
            let token = KeysetCursor::codec()
                .encode(cursor)
                .context("failed to encode cursor")?;
            writeln!(out, "{token}")?;
        }
        Command::DecodeCursor(token) => {
            let cursor = KeysetCursor::<u64>::codec()
                .decode(token)
                .context("failed to decode cursor")?;
            match cursor {
                Some(cursor) => writeln!(out, "{}", serde_json::to_string(&cursor)?)?,
                None => writeln!(out, "no cursor")?,
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn build_generator(config: &Config) -> anyhow::Result<Box<dyn IdGenerator>> {
    let generator: Box<dyn IdGenerator> = match config.generator {
        GeneratorKind::Lock => Box::new(
            LockGenerator::new(config.machine_tag)?.with_regression(config.regression),
        ),
        GeneratorKind::Atomic => Box::new(
            AtomicGenerator::new(config.machine_tag)?.with_regression(config.regression),
        ),
    };
    tracing::info!(
        machine_tag = config.machine_tag,
        generator = ?config.generator,
        regression = ?config.regression,
        "generator ready"
    );
    Ok(generator)
}

fn inspect<W: Write>(id: SnowflakeId, out: &mut W) -> anyhow::Result<()> {
    let time = DateTime::<Utc>::from(id.time()).to_rfc3339_opts(SecondsFormat::Millis, true);
    writeln!(out, "id:          {id}")?;
    writeln!(out, "timestamp:   {}", id.timestamp())?;
    writeln!(out, "time:        {time}")?;
    writeln!(out, "machine_tag: {}", id.machine_tag())?;
    writeln!(out, "sequence:    {}", id.sequence())?;
    if !id.is_valid() {
        tracing::warn!(%id, "reserved high bit is set");
    }
    Ok(())
}
