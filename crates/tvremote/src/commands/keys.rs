//! `keys`: list every control key, offline.

use serde::Serialize;
use tabled::Tabled;

use tvremote_core::ControlKey;

use crate::cli::GlobalOpts;
use crate::output;

#[derive(Debug, Serialize, Tabled)]
struct KeyRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Wire name")]
    wire: &'static str,
}

fn key_rows() -> Vec<KeyRow> {
    ControlKey::ALL
        .iter()
        .filter_map(|key| {
            let wire = key.as_str();
            wire.strip_prefix("KEY_").map(|bare| KeyRow {
                name: bare.to_ascii_lowercase(),
                wire,
            })
        })
        .collect()
}

pub fn handle(global: &GlobalOpts) {
    let rows = key_rows();
    let out = output::render_list(
        &global.output,
        &rows,
        |r| KeyRow {
            name: r.name.clone(),
            wire: r.wire,
        },
        |r| r.wire.to_string(),
    );
    output::print_output(&out, global.quiet);
}
