// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `reportbin validate` command - Validate configuration file.

use reportbin_core::{ConfigLoader, StoreBackend};

pub async fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Server Settings:");
            println!(
                "  Listen Address:     {}:{}",
                config.server.bind, config.server.port
            );
            println!("  Max Body Size:      {} bytes", config.server.max_body_bytes);
            println!("  Metrics Endpoint:   {}", config.server.metrics);
            println!();
            println!("Reports:");
            println!("  TTL:                {}", config.reports.ttl);
            println!();
            println!("Store:");
            match &config.store {
                StoreBackend::Memory { sweep_interval } => {
                    println!("  Backend:            memory");
                    println!("  Sweep Interval:     {}s", sweep_interval.as_secs());
                }
                StoreBackend::Upstash { url, .. } => {
                    println!("  Backend:            upstash");
                    println!("  Endpoint:           {}", url);
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
