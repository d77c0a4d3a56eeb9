// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `frugal models` command.

use frugal_cost::{ModelProfile, ModelRegistry};

fn row(p: &ModelProfile) -> String {
    format!(
        "{:<20} {:<10} {:<28} {:>10.5} {:>10.5}",
        p.id.to_string(),
        p.provider.to_string(),
        p.api_model,
        p.input_per_k,
        p.output_per_k,
    )
}

pub fn print_catalogue() {
    println!(
        "{:<20} {:<10} {:<28} {:>10} {:>10}",
        "MODEL", "PROVIDER", "UPSTREAM NAME", "IN $/1K", "OUT $/1K"
    );
    for profile in ModelRegistry::new().profiles() {
        println!("{}", row(profile));
    }
}
