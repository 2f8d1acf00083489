use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Channel binding used to exchange frames with the host process.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TransportKind {
    /// Line-delimited JSON-RPC over standard input and output.
    #[default]
    Stream,
    /// Request and response artefacts polled in an exchange directory.
    File,
}

/// Errors encountered while parsing a [`TransportKind`] from text.
pub type TransportKindParseError = strum::ParseError;
