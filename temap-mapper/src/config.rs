use std::fmt::{self, Display};
use std::fs::read_to_string;
use std::path::Path;

use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};

use temap_core::models::EvidenceKind;

use crate::consts::{
    DEFAULT_FAMILY_AMBIGUITY_MARGIN, DEFAULT_MIN_ANCHOR_SUPPORT, DEFAULT_MIN_JUNCTION_CLIP,
    DEFAULT_WINDOW_SIZE_ANCHOR, DEFAULT_WINDOW_SIZE_JUNCTION,
};
use crate::errors::{ConfigError, ConfigResult};

///
/// Run parameters as written in a TOML file or collected from the command line.
///
/// Every field is optional. Numeric fields are signed so that nonsensical
/// values can be reported instead of silently wrapping; call
/// [`MapperConfig::validate`] before using them.
///
/// ```toml
/// window_size_junction = 5
/// window_size_anchor = 450
/// min_junction_clip = 10
/// min_anchor_support = 3
/// family_ambiguity_margin = 1
/// contigs = ["2L", "2R", "3L", "3R", "4", "X", "Y"]
/// threads = 8
/// ```
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct MapperConfig {
    pub window_size_junction: Option<i64>,
    pub window_size_anchor: Option<i64>,
    pub insert_size: Option<i64>,
    pub min_junction_clip: Option<i64>,
    pub min_anchor_support: Option<i64>,
    pub family_ambiguity_margin: Option<i64>,
    pub contigs: Option<Vec<String>>,
    pub threads: Option<usize>,
}

fn non_negative(name: &'static str, value: i64) -> ConfigResult<u64> {
    u64::try_from(value).map_err(|_| ConfigError::Negative { name, value })
}

fn positive(name: &'static str, value: i64) -> ConfigResult<u64> {
    match non_negative(name, value)? {
        0 => Err(ConfigError::Zero { name }),
        v => Ok(v),
    }
}

fn small(name: &'static str, value: u64) -> ConfigResult<u32> {
    u32::try_from(value).map_err(|_| ConfigError::TooLarge {
        name,
        value: value as i64,
    })
}

impl MapperConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let toml_str = read_to_string(path)?;
        Self::from_toml_str(&toml_str)
    }

    pub fn from_toml_str(toml_str: &str) -> ConfigResult<Self> {
        let config = toml::from_str(toml_str)?;
        Ok(config)
    }

    ///
    /// Overlay every option set in `other` on top of this config.
    ///
    pub fn merge(mut self, other: MapperConfig) -> Self {
        macro_rules! overlay {
            ($($field:ident),+) => {
                $(if other.$field.is_some() { self.$field = other.$field; })+
            };
        }
        overlay!(
            window_size_junction,
            window_size_anchor,
            insert_size,
            min_junction_clip,
            min_anchor_support,
            family_ambiguity_margin,
            contigs,
            threads
        );
        self
    }

    ///
    /// Check every option and fill in defaults. The anchor window may still
    /// depend on the input data; see [`ValidatedConfig::resolve`].
    ///
    pub fn validate(&self) -> ConfigResult<ValidatedConfig> {
        let window_size_junction = match self.window_size_junction {
            Some(v) => non_negative("window_size_junction", v)?,
            None => DEFAULT_WINDOW_SIZE_JUNCTION,
        };
        let window_size_anchor = self
            .window_size_anchor
            .map(|v| non_negative("window_size_anchor", v))
            .transpose()?;
        let insert_size = self
            .insert_size
            .map(|v| positive("insert_size", v))
            .transpose()?;
        let min_junction_clip = match self.min_junction_clip {
            Some(v) => small("min_junction_clip", positive("min_junction_clip", v)?)?,
            None => DEFAULT_MIN_JUNCTION_CLIP,
        };
        let min_anchor_support = match self.min_anchor_support {
            Some(v) => small("min_anchor_support", non_negative("min_anchor_support", v)?)?,
            None => DEFAULT_MIN_ANCHOR_SUPPORT,
        };
        let family_ambiguity_margin = match self.family_ambiguity_margin {
            Some(v) => small(
                "family_ambiguity_margin",
                non_negative("family_ambiguity_margin", v)?,
            )?,
            None => DEFAULT_FAMILY_AMBIGUITY_MARGIN,
        };
        let contigs = match &self.contigs {
            Some(list) if list.is_empty() => return Err(ConfigError::EmptyContigList),
            Some(list) => Some(list.iter().cloned().collect::<FxHashSet<String>>()),
            None => None,
        };
        if self.threads == Some(0) {
            return Err(ConfigError::Zero { name: "threads" });
        }

        Ok(ValidatedConfig {
            window_size_junction,
            window_size_anchor,
            insert_size,
            min_junction_clip,
            min_anchor_support,
            family_ambiguity_margin,
            contigs,
            threads: self.threads,
        })
    }
}

/// Where the anchor clustering window came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorWindowSource {
    Configured,
    InsertSize,
    Estimated,
    Default,
}

impl Display for AnchorWindowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorWindowSource::Configured => write!(f, "configured"),
            AnchorWindowSource::InsertSize => write!(f, "insert size"),
            AnchorWindowSource::Estimated => write!(f, "estimated from pairs"),
            AnchorWindowSource::Default => write!(f, "default"),
        }
    }
}

/// A config that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub window_size_junction: u64,
    pub window_size_anchor: Option<u64>,
    pub insert_size: Option<u64>,
    pub min_junction_clip: u32,
    pub min_anchor_support: u32,
    pub family_ambiguity_margin: u32,
    pub contigs: Option<FxHashSet<String>>,
    pub threads: Option<usize>,
}

impl ValidatedConfig {
    pub fn needs_insert_size_estimate(&self) -> bool {
        self.window_size_anchor.is_none() && self.insert_size.is_none()
    }

    ///
    /// Fix the anchor window: an explicit window wins, then an explicit insert
    /// size, then the estimate from the input pairs, then the built-in default.
    ///
    pub fn resolve(&self, estimated_insert_size: Option<u64>) -> MapperParams {
        let (window_size_anchor, anchor_window_source) =
            match (self.window_size_anchor, self.insert_size, estimated_insert_size) {
                (Some(w), _, _) => (w, AnchorWindowSource::Configured),
                (None, Some(i), _) => (i, AnchorWindowSource::InsertSize),
                (None, None, Some(e)) => (e, AnchorWindowSource::Estimated),
                (None, None, None) => (DEFAULT_WINDOW_SIZE_ANCHOR, AnchorWindowSource::Default),
            };

        MapperParams {
            window_size_junction: self.window_size_junction,
            window_size_anchor,
            anchor_window_source,
            min_junction_clip: self.min_junction_clip,
            min_anchor_support: self.min_anchor_support,
            family_ambiguity_margin: self.family_ambiguity_margin,
            contigs: self.contigs.clone(),
        }
    }
}

/// Fully resolved, read-only parameters shared by every contig worker.
#[derive(Debug, Clone, PartialEq)]
pub struct MapperParams {
    pub window_size_junction: u64,
    pub window_size_anchor: u64,
    pub anchor_window_source: AnchorWindowSource,
    pub min_junction_clip: u32,
    pub min_anchor_support: u32,
    pub family_ambiguity_margin: u32,
    pub contigs: Option<FxHashSet<String>>,
}

impl Default for MapperParams {
    fn default() -> Self {
        MapperParams {
            window_size_junction: DEFAULT_WINDOW_SIZE_JUNCTION,
            window_size_anchor: DEFAULT_WINDOW_SIZE_ANCHOR,
            anchor_window_source: AnchorWindowSource::Default,
            min_junction_clip: DEFAULT_MIN_JUNCTION_CLIP,
            min_anchor_support: DEFAULT_MIN_ANCHOR_SUPPORT,
            family_ambiguity_margin: DEFAULT_FAMILY_AMBIGUITY_MARGIN,
            contigs: None,
        }
    }
}

impl MapperParams {
    pub fn window_for(&self, evidence: EvidenceKind) -> u64 {
        match evidence {
            EvidenceKind::Junction => self.window_size_junction,
            EvidenceKind::Anchor => self.window_size_anchor,
        }
    }

    pub fn allows_contig(&self, contig: &str) -> bool {
        self.contigs
            .as_ref()
            .is_none_or(|allowed| allowed.contains(contig))
    }
}
