pub const REQUIRED_METADATA_FIELDS: [&str; 4] = ["block_device", "interfaces", "cpu", "memory"];
