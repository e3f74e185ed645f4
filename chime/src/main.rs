// SPDX-FileCopyrightText: 2025-2026 The chime developers
//
// SPDX-License-Identifier: Apache-2.0

//! Chime - keep reminder alarms in step across paired devices

use std::error::Error;

use chime_cli::run;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    run().await
}
