use std::error::Error;
use std::io;
use std::process;

fn example() -> Result<(), Box<dyn Error>> {
    let mut wtr = csvrecord::WriterBuilder::new()
        .terminator(csvrecord::Terminator::Any('\n'))
        .from_writer(io::stdout())?;

    // The header row is written just like any other record.
    wtr.write_record(&["city", "region", "country", "population"])?;
    wtr.write_record(&["Southborough", "MA", "United States", "9686"])?;
    wtr.write_record(&["Northbridge", "MA", "United States", "14061"])?;
    wtr.write_record(&["Concord", "MA", "United States, \"USA\"", "42695"])?;
    wtr.flush()?;
    Ok(())
}

fn main() {
    if let Err(err) = example() {
        println!("error running example: {}", err);
        process::exit(1);
    }
}
