//! Default values for pipeline configuration fields.

pub fn default_max_joins() -> usize {
    3
}

pub fn default_row_cap() -> u64 {
    500
}

pub fn default_row_cap_ceiling() -> u64 {
    500
}

pub fn default_execution_timeout_ms() -> u64 {
    5_000
}

pub fn default_snapshot_dir() -> String {
    "./data/snapshots".to_string()
}

pub fn default_table_prefix() -> String {
    "snap_".to_string()
}

pub fn default_snapshot() -> String {
    "current".to_string()
}

pub fn default_details_row_cap() -> usize {
    10
}

pub fn default_chars_per_token() -> usize {
    4
}

pub fn default_slow_query_threshold_ms() -> u64 {
    1_000
}
