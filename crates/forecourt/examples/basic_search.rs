//! Basic search example: assemble a pipeline, register an observer and run
//! a few queries against an in-memory station set.

use std::sync::Arc;

use anyhow::Result;
use forecourt::{
    FixedDistanceResolver, FnObserver, OpeningHours, SearchRequest, SortMode, StaticStationSource,
    Station, StationPipeline,
};
use tracing::{Level, info};

fn sample_stations() -> Vec<Station> {
    vec![
        Station::new(1, "Shell Kreuzberg", "Skalitzer Str. 1", 1.79)
            .with_amenities(["carWash", "atm"])
            .with_items(["coffee", "sandwiches"])
            .with_hours(OpeningHours::new(6, 22)),
        Station::new(2, "Aral Mitte", "Torstr. 10", 1.82)
            .with_amenities(["atm", "convenienceStore"])
            .with_hours(OpeningHours::new(0, 23)),
        Station::new(3, "Esso Nord", "Seestr. 44", 1.71)
            .with_amenities(["diesel"])
            .with_hours(OpeningHours::new(5, 23)),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    forecourt::init_logging(Level::INFO)?;

    let pipeline = StationPipeline::builder()
        .source(StaticStationSource::new(sample_stations()))
        .resolver(FixedDistanceResolver::new([
            (1.into(), 3.4),
            (2.into(), 0.9),
            (3.into(), 6.1),
        ]))
        .build()?;

    pipeline.add_observer(Arc::new(FnObserver::new(|stations: &[Station]| {
        println!("--- {} result(s) ---", stations.len());
        for station in stations {
            println!(
                "{} | {} | {:.2}/l",
                station.name, station.address, station.gas_price
            );
        }
    })));

    // Everything, cheapest first.
    pipeline
        .run(&SearchRequest::new("", SortMode::ByPrice))
        .await?;

    // Everything, nearest first.
    pipeline
        .run(&SearchRequest::new("", SortMode::ByDistance))
        .await?;

    // Only stations selling coffee.
    pipeline
        .run(&SearchRequest::new("coffee", SortMode::ByPrice))
        .await?;

    if let Some(closest) = pipeline.closest_station().await? {
        info!(name = %closest.name, "closest station");
    }
    let cheapest = pipeline.cheapest_station()?;
    info!(name = %cheapest.name, price = cheapest.gas_price, "cheapest station");

    Ok(())
}
