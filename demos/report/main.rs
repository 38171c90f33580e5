//! Prints the representation chosen for a few fixture solids under each
//! format preset.
//!
//! Usage:
//! ```text
//! cargo run --example report                    # every preset
//! cargo run --example report -- reference       # one preset
//! RUST_LOG=shaperep=debug cargo run --example report
//! ```

use std::f64::consts::FRAC_PI_2;

use shaperep::export::{ExportOptions, FormatCapabilities, GeometryItem, RepresentationSelector, TessellationLevel};
use shaperep::math::{Point3, Vector3};
use shaperep::mesh::Mesh;
use shaperep::operations::creation::{MakeBox, MakeCylinder, MakeFace, MakeWire};
use shaperep::operations::shaping::Revolve;
use shaperep::topology::TopologyStore;
use shaperep::Result;

fn fixtures(store: &mut TopologyStore) -> Result<Vec<(&'static str, GeometryItem)>> {
    let cube = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).execute(store)?;
    let cylinder = MakeCylinder::new(Point3::origin(), 0.5, Vector3::z(), 2.0).execute(store)?;
    let wire = MakeWire::new(
        vec![
            Point3::origin(),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
        ],
        true,
    )
    .execute(store)?;
    let face = MakeFace::new(wire, vec![]).execute(store)?;
    let cone = Revolve::new(face, Point3::origin(), Vector3::z(), FRAC_PI_2).execute(store)?;
    let triangle = Mesh::new(vec![[
        Point3::origin(),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ]]);
    Ok(vec![
        ("cube", GeometryItem::Solid(cube)),
        ("cylinder", GeometryItem::Solid(cylinder)),
        ("quarter cone", GeometryItem::Solid(cone)),
        ("triangle", GeometryItem::Mesh(triangle)),
    ])
}

fn presets() -> Vec<(&'static str, ExportOptions)> {
    vec![
        ("ifc4", ExportOptions::default()),
        (
            "ifc4-brep",
            ExportOptions::default().with_extrusion(false).with_swept_solid(false),
        ),
        (
            "ifc2x3",
            ExportOptions::default()
                .with_capabilities(FormatCapabilities::ifc2x3())
                .with_tessellation_level(TessellationLevel::Coarse),
        ),
        (
            "reference",
            ExportOptions::default().with_capabilities(FormatCapabilities::reference_view()),
        ),
        (
            "triangulated",
            ExportOptions::default()
                .with_extrusion(false)
                .with_capabilities(FormatCapabilities::triangulated()),
        ),
    ]
}

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for shaperep.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("shaperep=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let only = std::env::args().nth(1);
    let mut store = TopologyStore::new();
    let fixtures = fixtures(&mut store)?;

    for (preset, options) in presets() {
        if only.as_deref().is_some_and(|o| o != preset) {
            continue;
        }
        println!("{preset}");
        for (name, item) in &fixtures {
            match RepresentationSelector::new(&store, options).build(std::slice::from_ref(item)) {
                Ok(result) => println!("  {name:<14}{:?}", result.shape_kind),
                Err(err) => println!("  {name:<14}failed: {err}"),
            }
        }
    }
    Ok(())
}
