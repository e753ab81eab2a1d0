pub const DEFAULT_WINDOW_SIZE_JUNCTION: u64 = 5;
pub const DEFAULT_WINDOW_SIZE_ANCHOR: u64 = 500;
pub const DEFAULT_MIN_JUNCTION_CLIP: u32 = 10;
pub const DEFAULT_MIN_ANCHOR_SUPPORT: u32 = 3;
pub const DEFAULT_FAMILY_AMBIGUITY_MARGIN: u32 = 1;

pub const RECORD_COLUMNS: usize = 10;
pub const RECORD_HEADER_FIRST_FIELD: &str = "read_id";
pub const COMMENT_PREFIX: char = '#';
pub const EMPTY_FIELD: &str = "*";

pub const CALLS_HEADER: &str = "contig\tposition\tinterval_start\tinterval_end\ttsd_start\ttsd_end\tstrand\torientation\tte_family\tjunction_support\tanchor_support\tupstream_support\tdownstream_support\tflanks\tconfidence";
