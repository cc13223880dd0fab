//! Golden test for the checked-in fixture package.
//!
//! `tests/fixtures/layercfg_fixture` is a workspace member that compiles the
//! generated module, so this test also guards that the emitter's output
//! builds.

mod common;

use cargo_layercfg::synth::AggregateField;
use cargo_layercfg::{GenerateOptions, render};
use rstest::rstest;

#[rstest]
fn fixture_output_matches_checked_in_file() {
    let package = common::fixture_package();
    let rendered = render(&package, GenerateOptions::default()).expect("render fixture");
    let expected = std::fs::read_to_string(&rendered.output_path).expect("read golden file");

    assert_eq!(rendered.text, expected, "regenerate with `cargo layercfg tests/fixtures/layercfg_fixture`");
}

#[rstest]
fn fixture_skips_the_non_literal_argument() {
    let rendered =
        render(&common::fixture_package(), GenerateOptions::default()).expect("render fixture");

    assert_eq!(rendered.aggregate.fields.len(), 7);
    assert!(matches!(
        rendered.aggregate.fields.as_slice(),
        [AggregateField::Marker, AggregateField::Spacer, ..]
    ));
    let skipped: Vec<_> = rendered.skipped.iter().map(|skip| skip.index).collect();
    assert_eq!(skipped, [3]);
}
