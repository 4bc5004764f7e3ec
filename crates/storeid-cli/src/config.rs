use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use storeid::{ClockRegression, EntityType, Gid, KeysetCursor, SnowflakeId};

/// Upper bound on `generate --count`.
pub const MAX_COUNT: usize = 1_000_000;

/// Command-line arguments for the `storeid` binary.
///
/// Global options may also come from the environment (or a `.env` file).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "storeid",
    version,
    about = "Mint Snowflake IDs and inspect GIDs and pagination cursors"
)]
pub struct CliArgs {
    /// Machine tag embedded in every generated ID, `0..=1023`.
    ///
    /// Each running process must use a distinct tag.
    ///
    /// Environment variable: `MACHINE_ID`
    #[arg(long, env = "MACHINE_ID", default_value_t = 0)]
    pub machine_id: u16,

    /// Generator implementation.
    ///
    /// Environment variable: `GENERATOR`
    #[arg(long, env = "GENERATOR", value_enum, default_value_t = GeneratorKind::Lock)]
    pub generator: GeneratorKind,

    /// Wait for the clock to catch up after it moves backward, instead of
    /// issuing IDs at the earlier time.
    #[arg(long, default_value_t = false)]
    pub stall_on_regression: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GeneratorKind {
    /// Mutex-guarded state
    Lock,
    /// Lock-free compare-and-swap state
    Atomic,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Generate new IDs, one per line.
    Generate {
        /// How many IDs to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Print each ID as a GID of this entity type, e.g. `Product`.
        #[arg(long)]
        entity: Option<String>,

        /// Print GIDs in compact (base64) form.
        #[arg(long, requires = "entity")]
        compact: bool,
    },

    /// Decode the fields of an ID. Accepts a decimal ID or a GID.
    Inspect { id: String },

    /// Parse a canonical or compact GID and print both forms.
    Gid { text: String },

    /// Encode or decode keyset pagination cursors.
    #[command(subcommand)]
    Cursor(CursorCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum CursorCommand {
    /// Build a cursor token from a row's creation time and id.
    Encode {
        /// RFC 3339 timestamp, e.g. `2024-05-01T12:00:00Z`.
        #[arg(long)]
        created_at: String,

        #[arg(long)]
        id: u64,
    },

    /// Print the payload of a cursor token as JSON.
    Decode { token: String },
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub machine_tag: u16,
    pub generator: GeneratorKind,
    pub regression: ClockRegression,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Generate {
        count: usize,
        entity: Option<EntityType>,
        compact: bool,
    },
    Inspect(SnowflakeId),
    Gid(Gid),
    EncodeCursor(KeysetCursor),
    DecodeCursor(String),
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.machine_id > SnowflakeId::MAX_MACHINE_TAG {
            bail!(
                "MACHINE_ID ({}) exceeds the machine tag space (max = {})",
                args.machine_id,
                SnowflakeId::MAX_MACHINE_TAG
            );
        }

        let regression = if args.stall_on_regression {
            ClockRegression::Stall
        } else {
            ClockRegression::Follow
        };

        Ok(Self {
            machine_tag: args.machine_id,
            generator: args.generator,
            regression,
            command: Command::try_from(args.command)?,
        })
    }
}

impl TryFrom<CliCommand> for Command {
    type Error = anyhow::Error;

    fn try_from(command: CliCommand) -> Result<Self, Self::Error> {
        Ok(match command {
            CliCommand::Generate {
                count,
                entity,
                compact,
            } => {
                if count == 0 || count > MAX_COUNT {
                    bail!("--count must be in 1..={MAX_COUNT}, got {count}");
                }
                let entity = entity
                    .map(|tag| tag.parse::<EntityType>())
                    .transpose()
                    .context("invalid --entity")?;
                Self::Generate {
                    count,
                    entity,
                    compact,
                }
            }
            CliCommand::Inspect { id } => Self::Inspect(parse_id(&id)?),
            CliCommand::Gid { text } => {
                let gid = Gid::parse_any(text.trim())
                    .with_context(|| format!("invalid GID {text:?}"))?;
                Self::Gid(gid)
            }
            CliCommand::Cursor(CursorCommand::Encode { created_at, id }) => {
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .with_context(|| format!("invalid --created-at {created_at:?}"))?
                    .with_timezone(&Utc);
                let cursor = KeysetCursor::new(created_at, id);
                if let Err(reason) = cursor.validate() {
                    bail!("cannot encode cursor: {reason}");
                }
                Self::EncodeCursor(cursor)
            }
            CliCommand::Cursor(CursorCommand::Decode { token }) => Self::DecodeCursor(token),
        })
    }
}

/// A decimal ID, or any GID whose raw id is taken.
fn parse_id(text: &str) -> anyhow::Result<SnowflakeId> {
    let text = text.trim();
    if let Ok(raw) = text.parse::<u64>() {
        return Ok(SnowflakeId::from_raw(raw));
    }
    let gid = Gid::parse_any(text)
        .with_context(|| format!("{text:?} is neither a decimal ID nor a GID"))?;
    Ok(SnowflakeId::from_raw(gid.id()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use clap::CommandFactory;

    use super::*;

    fn parse_args(args: &[&str]) -> anyhow::Result<Config> {
        let argv = std::iter::once("storeid").chain(args.iter().copied());
        let args = CliArgs::try_parse_from(argv)?;
        Config::try_from(args)
    }

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let config = parse_args(&["--machine-id", "0", "generate"]).unwrap();
        assert_eq!(config.machine_tag, 0);
        assert_eq!(config.generator, GeneratorKind::Lock);
        assert_eq!(config.regression, ClockRegression::Follow);
        assert_eq!(
            config.command,
            Command::Generate {
                count: 1,
                entity: None,
                compact: false
            }
        );
    }

    #[test]
    fn global_options() {
        let config = parse_args(&[
            "--machine-id",
            "1023",
            "--generator",
            "atomic",
            "--stall-on-regression",
            "generate",
            "-n",
            "5",
            "--entity",
            "ProductVariant",
            "--compact",
        ])
        .unwrap();
        assert_eq!(config.machine_tag, 1023);
        assert_eq!(config.generator, GeneratorKind::Atomic);
        assert_eq!(config.regression, ClockRegression::Stall);
        assert_eq!(
            config.command,
            Command::Generate {
                count: 5,
                entity: Some(EntityType::ProductVariant),
                compact: true
            }
        );
    }

    #[test]
    fn rejects_machine_id_out_of_range() {
        let err = parse_args(&["--machine-id", "1024", "generate"]).unwrap_err();
        assert!(err.to_string().contains("MACHINE_ID (1024)"), "{err}");
    }

    #[test]
    fn rejects_bad_count() {
        assert!(parse_args(&["--machine-id", "1", "generate", "-n", "0"]).is_err());
        let too_many = (MAX_COUNT + 1).to_string();
        assert!(parse_args(&["--machine-id", "1", "generate", "-n", &too_many]).is_err());
    }

    #[test]
    fn rejects_unknown_entity() {
        let err =
            parse_args(&["--machine-id", "1", "generate", "--entity", "Widget"]).unwrap_err();
        assert!(format!("{err:#}").contains("unknown entity type"), "{err:#}");
    }

    #[test]
    fn compact_requires_entity() {
        assert!(parse_args(&["--machine-id", "1", "generate", "--compact"]).is_err());
    }

    #[test]
    fn inspect_accepts_decimal_and_gid() {
        let id = SnowflakeId::new(1_000, 42, 7);
        let decimal = id.to_string();
        let canonical = Gid::product(id.to_raw()).to_canonical();
        let compact = Gid::product(id.to_raw()).to_compact();
        for text in [decimal.as_str(), canonical.as_str(), compact.as_str()] {
            let config = parse_args(&["--machine-id", "1", "inspect", text]).unwrap();
            assert_eq!(config.command, Command::Inspect(id), "{text}");
        }
        assert!(parse_args(&["--machine-id", "1", "inspect", "nope"]).is_err());
    }

    #[test]
    fn gid_command_parses_either_form() {
        let gid = Gid::store(9);
        for text in [gid.to_canonical(), gid.to_compact()] {
            let config = parse_args(&["--machine-id", "1", "gid", &text]).unwrap();
            assert_eq!(config.command, Command::Gid(gid));
        }
        assert!(parse_args(&["--machine-id", "1", "gid", "gid://mystoreos/Store/"]).is_err());
    }

    #[test]
    fn cursor_encode_validates_input() {
        let config = parse_args(&[
            "--machine-id",
            "1",
            "cursor",
            "encode",
            "--created-at",
            "2024-05-01T14:00:00+02:00",
            "--id",
            "7",
        ])
        .unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(
            config.command,
            Command::EncodeCursor(KeysetCursor::new(expected, 7))
        );

        for (created_at, id) in [
            ("yesterday", "7"),
            ("1970-01-01T00:00:00Z", "7"),
            ("2024-05-01T12:00:00Z", "0"),
        ] {
            let args = [
                "--machine-id",
                "1",
                "cursor",
                "encode",
                "--created-at",
                created_at,
                "--id",
                id,
            ];
            assert!(parse_args(&args).is_err(), "{created_at} {id}");
        }
    }
}
