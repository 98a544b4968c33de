// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Kinds command - list the built-in node kinds

use miette::Result;

use crate::providers::StandardNodes;
use crate::utils::{code, dimmed, print_header};

/// Run the kinds command
pub fn run(verbose: bool) -> Result<()> {
    print_header("Node kinds");

    for info in StandardNodes::catalog() {
        let ports = format!("({}) -> ({})", info.inputs.join(", "), info.outputs.join(", "));
        println!("  {:<22} {}", code(info.kind), ports);
        if verbose {
            println!("  {:<22} {}", "", dimmed(info.summary));
        }
    }

    Ok(())
}
