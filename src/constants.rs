//! Global constants used throughout the calclineage codebase.
//!
//! Defaults that the configuration layer falls back to, plus a handful of
//! fixed markers shared by the identity, calculation and output modules.

/// Default seed for the salt generator.
pub const DEFAULT_SEED: u64 = 10;

/// Default number of lowercase letters in the identifier salt.
pub const DEFAULT_SALT_LENGTH: usize = 10;

/// Upper bound on salt draws before giving up.
///
/// With ten letters the chance of a draw appearing inside real calculation
/// text is negligible, so hitting this bound means the salt length is far too
/// short for the workbook.
pub const MAX_SALT_ATTEMPTS: usize = 10_000;

/// Raw data-source name reserved for workbook parameters.
pub const DEFAULT_PARAMETERS_SOURCE: &str = "Parameters";

/// Pseudo field that every workbook carries and that never has lineage.
pub const DEFAULT_MEASURE_NAMES_FIELD: &str = "[:Measure Names]";

/// Infix that separates sheet ids from field ids sharing the same salt.
pub const SHEET_ID_INFIX: &str = "sh";

/// Separator used when list columns are flattened into a single CSV cell.
pub const LIST_SEPARATOR: &str = "; ";

/// Suffix appended to the input file name for the default output directory.
pub const OUTPUT_DIR_SUFFIX: &str = " Files";

/// Subdirectory of the output directory holding the two tables.
pub const FIELDS_DIR: &str = "Fields";

/// Subdirectory of the output directory holding DOT graphs.
pub const GRAPHS_DIR: &str = "Graphs";

/// Subdirectory of [`GRAPHS_DIR`] holding per-sheet graphs.
pub const SHEETS_GRAPH_DIR: &str = "Sheets";

/// File name of the run summary.
pub const SUMMARY_FILE: &str = "summary.json";

/// Path length that downstream consumers on some platforms cannot exceed.
///
/// Graph files whose full path would exceed this are rejected.
pub const MAX_PATH_LENGTH: usize = 260;

/// Default configuration directory name under the user's home.
pub const CONFIG_DIR_NAME: &str = ".calclineage";

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Maximum edit distance, as a percentage of the requested name's length, for
/// a field label to be offered as a "did you mean" suggestion.
pub const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Number of suggestions offered for an unknown field.
pub const MAX_SUGGESTIONS: usize = 3;
