// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end specs: a real `vjd` driven through the `vj` binary.
//!
//! Commands run through the local transport against a fake `gluster`
//! script placed first on `PATH`.

mod prelude;

mod cli {
    mod errors;
    mod help;
}

mod job {
    mod accept;
    mod failure;
    mod wait;
}

mod daemon {
    mod lifecycle;
    mod recovery;
}
