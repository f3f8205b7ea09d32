use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    accessai::cli::main()
}
