//! Test fixtures and constants.

/// Document with one reference next to a plain value.
pub const DB_CONFIG: &str = "password: ENC[db_pass]\nhost: db.internal\n";

/// Backend answer for [`DB_CONFIG`].
pub const DB_RESPONSE: &str = r#"{"db_pass":{"value":"s3cr3t","error":""}}"#;

/// Document referencing three handles at different depths.
pub const NESTED_CONFIG: &str = r#"
instances:
  - host: db1
    password: ENC[a]
  - host: db2
    password: ENC[b]
    tags:
      - prod
      - ENC[c]
logs_enabled: true
port: 5432
"#;

/// Backend answer resolving every handle in [`NESTED_CONFIG`].
pub const NESTED_RESPONSE: &str = r#"{"a":{"value":"one","error":""},"b":{"value":"two","error":""},"c":{"value":"three","error":""}}"#;

/// Document without any references.
pub const PLAIN_CONFIG: &str = "# kept verbatim\nhost:   db.internal\nport: 5432\n";
