use std::env;
use std::error::Error;
use std::fs;

use qrkit::{ContentPayload, ExportFormat, FileBackend, LinkRecord, PresetStore, Session};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let url = env::args().nth(1).unwrap_or_else(|| "https://example.com".to_string());

    let store = PresetStore::open(Box::new(FileBackend::new(".")));
    let mut session = Session::new(store);
    session.set_payload(ContentPayload::Link(LinkRecord { url: url.clone() }));

    println!("Rendering {url} ({} renderer)...", session.render_mode());
    for format in [ExportFormat::Png, ExportFormat::Svg] {
        match session.export(format) {
            Some(bundle) => {
                fs::write(&bundle.filename, &bundle.bytes)?;
                println!("Saved {}", bundle.filename);
            }
            None => println!("Nothing to export as {}", format.extension()),
        }
    }

    if let Some(preset) = session.save_preset() {
        println!("Saved preset {:?}", preset.name);
    }
    println!("{} preset(s) stored", session.presets().len());

    Ok(())
}
