use std::process::exit;

use itertools::Itertools;

use ct_net::model::TowerShape;
use ct_net::weights::load_weights_from_path;

fn main() {
    let args = std::env::args().collect_vec();
    if args.len() != 2 && args.len() != 3 {
        eprintln!("Usage: load_net <path.bin> [tower_depth]");
        exit(1);
    }

    let mut shape = TowerShape::default();
    if let Some(depth) = args.get(2) {
        match depth.parse() {
            Ok(depth) => shape = shape.with_depth(depth),
            Err(_) => {
                eprintln!("Invalid tower depth {:?}", depth);
                exit(1);
            }
        }
    }

    let path = &args[1];
    match load_weights_from_path(path, shape) {
        Ok(net) => println!("{}", net),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}
