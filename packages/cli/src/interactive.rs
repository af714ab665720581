//! Interactive region picker.
//!
//! Prompts for a region, shows its flood statistics and top solution
//! categories, and optionally its weak facilities, until the user stops.

use dialoguer::{Confirm, Select};
use flood_map_cli_utils::{MultiProgress, with_spinner};
use flood_map_recommend::{rank, top};
use flood_map_region_models::all_regions;
use flood_map_wfs::{FeatureSource, fetch_facility_details, fetch_region_stats};

use crate::output;

/// Top-level choices of the interactive mode.
enum Tool {
    LookUp,
    Server,
}

impl Tool {
    const ALL: &[Self] = &[Self::LookUp, Self::Server];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::LookUp => "Look up a region",
            Self::Server => "Start server",
        }
    }
}

/// Runs the interactive mode against `source`.
///
/// # Errors
///
/// Returns an error if a prompt fails or the server cannot start.
pub async fn run<S: FeatureSource + ?Sized>(
    multi: &MultiProgress,
    source: &S,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Gyeonggi Flood Map");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::LookUp => look_up(multi, source).await,
        Tool::Server => {
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(flood_map_server::interactive::run())
            })
            .await??;
            Ok(())
        }
    }
}

async fn look_up<S: FeatureSource + ?Sized>(
    multi: &MultiProgress,
    source: &S,
) -> Result<(), Box<dyn std::error::Error>> {
    let regions = all_regions();
    let labels: Vec<String> = regions
        .iter()
        .map(|r| format!("{} ({})", r.name, r.code))
        .collect();
    let mut selected = 0;

    loop {
        selected = Select::new()
            .with_prompt("Region")
            .items(&labels)
            .default(selected)
            .interact()?;
        let region = &regions[selected];

        let stats = with_spinner(
            multi,
            &format!("Loading flood statistics for {}", region.name),
            fetch_region_stats(source, &region.name, &region.code),
        )
        .await;

        println!();
        print!("{}", output::stats(region, &stats));
        println!();
        println!("Recommended solutions:");
        print!("{}", output::recommendations(top(&rank(&stats))));
        println!();

        if Confirm::new()
            .with_prompt("Show weak facilities?")
            .default(false)
            .interact()?
        {
            let facilities = with_spinner(
                multi,
                &format!("Loading weak facilities for {}", region.name),
                fetch_facility_details(source, &region.code),
            )
            .await;
            print!("{}", output::facilities(&facilities));
            println!();
        }

        if !Confirm::new()
            .with_prompt("Look up another region?")
            .default(true)
            .interact()?
        {
            return Ok(());
        }
    }
}
