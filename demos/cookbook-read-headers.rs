// To run this example, naming the column to print:
//
//   $ cargo run --example cookbook-read-headers population < data.csv
use std::env;
use std::error::Error;
use std::io;
use std::process;

fn example() -> Result<(), Box<dyn Error>> {
    let column = get_first_arg()?;
    let mut rdr = csvrecord::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(io::stdin())?;
    let headers = match rdr.headers()? {
        Some(headers) => headers.clone(),
        None => return Err(From::from("CSV data has no header row")),
    };
    if headers.index_of(&column).is_none() {
        return Err(From::from(format!("no column named {:?}", column)));
    }
    for result in rdr.records() {
        let record = result?;
        println!("{}", headers.get(&column, &record).unwrap_or(""));
    }
    Ok(())
}

fn get_first_arg() -> Result<String, Box<dyn Error>> {
    match env::args().nth(1) {
        Some(column) => Ok(column),
        None => Err(From::from("expected 1 argument, but got none")),
    }
}

fn main() {
    if let Err(err) = example() {
        println!("error running example: {}", err);
        process::exit(1);
    }
}
