use std::{env, fs, process};

use just_object_stream::{decode_stream, ObjectStreamError};

// Usage: dump <file> [class name] [field name]
fn main() {
    pretty_env_logger::init();

    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("Usage: dump <file> [class name] [field name]");
        process::exit(2);
    };
    let class_filter = args.next();
    let field_filter = args.next();

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("{}: {}", path, e);
            process::exit(1);
        }
    };

    let decoded = match decode_stream(&bytes) {
        Ok(decoded) => decoded,
        Err(e @ ObjectStreamError::MalformedHeader { .. }) => {
            eprintln!("Invalid STREAM_MAGIC, should be 0xac ed: {}", e);
            process::exit(1);
        }
        Err(e) => {
            log::error!("Decoding {} failed: {}", path, e);
            process::exit(1);
        }
    };

    let Some(class_name) = class_filter else {
        for object in decoded.objects() {
            println!("{}", object);
        }
        return;
    };

    for class in decoded.find_class(&class_name) {
        for field in &class.fields {
            if field_filter.as_deref().map_or(true, |name| name == field.name) {
                println!("{}", field);
            }
        }
    }
}
