// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plans for the standard volume and snapshot operations

use crate::catalog::{PlanCatalog, PlanError};

/// Built-in plan catalog. Every command emits the JSON result document.
pub const BUILTIN_CATALOG: &str = r#"
[operation."snapshot.create"]
description = "Take a snapshot of a volume"
vars = ["host", "volume"]

[[operation."snapshot.create".step]]
name = "create snapshot"
run = { command = "gluster --mode=script --format=json snapshot create ${target} ${volume} no-timestamp", expect = { node = "snapshot", required = ["name"] } }
compensate = { name = "delete snapshot", command = "gluster --mode=script --format=json snapshot delete ${target}" }


[operation."snapshot.clone"]
description = "Clone a snapshot into a new, started volume"
vars = ["host", "volume"]

[[operation."snapshot.clone".step]]
name = "activate snapshot"
run = { command = "gluster --mode=script --format=json snapshot activate ${target}" }
finalize = { name = "deactivate snapshot", command = "gluster --mode=script --format=json snapshot deactivate ${target}" }

[[operation."snapshot.clone".step]]
name = "clone volume"
run = { command = "gluster --mode=script --format=json snapshot clone ${volume} ${target}" }
compensate = { name = "delete volume", command = "gluster --mode=script --format=json volume delete ${volume}" }

[[operation."snapshot.clone".step]]
name = "start volume"
run = { command = "gluster --mode=script --format=json volume start ${volume}", expect = { node = "volume", required = ["name"] } }


[operation."snapshot.destroy"]
description = "Delete a snapshot"
vars = ["host"]

[[operation."snapshot.destroy".step]]
name = "delete snapshot"
run = { command = "gluster --mode=script --format=json snapshot delete ${target}" }


[operation."snapshot.info"]
description = "Describe a snapshot"
vars = ["host"]

[[operation."snapshot.info".step]]
name = "snapshot info"
run = { command = "gluster --mode=script --format=json snapshot info ${target}", expect = { node = "snapshots", single = true, required = ["name"] } }


[operation."volume.create"]
description = "Create and start a single-brick volume"
vars = ["host", "brick"]

[[operation."volume.create".step]]
name = "create volume"
run = { command = "gluster --mode=script --format=json volume create ${target} ${brick} force" }
compensate = { name = "delete volume", command = "gluster --mode=script --format=json volume delete ${target}" }

[[operation."volume.create".step]]
name = "start volume"
run = { command = "gluster --mode=script --format=json volume start ${target}", expect = { node = "volume", required = ["name"] } }


[operation."volume.destroy"]
description = "Stop and delete a volume"
vars = ["host"]

[[operation."volume.destroy".step]]
name = "stop volume"
run = { command = "gluster --mode=script --format=json volume stop ${target} force" }

[[operation."volume.destroy".step]]
name = "delete volume"
run = { command = "gluster --mode=script --format=json volume delete ${target}" }


[operation."block.clone"]
description = "Clone a block volume snapshot"
unsupported = "cloning of block volumes is not implemented"
"#;

/// Parse [`BUILTIN_CATALOG`].
pub fn builtin_catalog() -> Result<PlanCatalog, PlanError> {
    PlanCatalog::parse(BUILTIN_CATALOG)
}

#[cfg(test)]
#[path = "builtin_tests.rs"]
mod tests;
