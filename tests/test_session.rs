mod common;
use common::*;

const SIDES: [u32; 3] = [20, 16, 12];

fn completed(outcome: RunOutcome) -> ExportSummary {
    match outcome {
        RunOutcome::Completed(summary) => summary,
        other => panic!("session did not complete: {:?}", other),
    }
}

#[test]
fn test_all_correct_exports_only_correct() -> anyhow::Result<()> {
    let ws = Workspace::new(&SIDES);
    let mut presenter = ScriptedPresenter::new(session_keys("ccc"));

    let summary = completed(Pipeline::open(ws.config())?.run(&mut presenter)?);

    assert_eq!(summary.total(), 3);
    assert_eq!(
        file_names(&ws.output_dir().join("correct")),
        ["c_00000000.png", "c_00000001.png", "c_00000002.png"]
    );
    assert!(file_names(&ws.output_dir().join("merged")).is_empty());
    assert!(file_names(&ws.output_dir().join("partial_sets")).is_empty());
    assert_eq!(presenter.remaining(), 0);
    Ok(())
}

#[test]
fn test_surfaces_open_and_close_in_step_order() -> anyhow::Result<()> {
    let ws = Workspace::new(&SIDES);
    let mut presenter = ScriptedPresenter::new(session_keys("pppcc"));

    Pipeline::open(ws.config())?.run(&mut presenter)?;

    let expected = [
        "Step 1. Thresholding",
        "Step 2. Segment detection",
        "Step 3. Segment tagging",
        "Step 4. Partial segment merging",
    ];
    assert_eq!(presenter.opened(), expected);
    assert_eq!(presenter.closed(), expected);
    Ok(())
}

#[test]
fn test_mixed_tags_land_in_their_directories() -> anyhow::Result<()> {
    let ws = Workspace::new(&[24, 20, 16, 12]);
    // correct, noise, merged, partial; the lone partial closes by itself
    let mut presenter = ScriptedPresenter::new(session_keys("cnmp"));

    let summary = completed(Pipeline::open(ws.config())?.run(&mut presenter)?);

    assert_eq!(summary.correct.len(), 1);
    assert_eq!(summary.merged.len(), 1);
    assert_eq!(summary.partial_sets.len(), 1);
    assert_eq!(file_names(&ws.output_dir().join("merged")), ["m_00000000.png"]);
    assert_eq!(file_names(&ws.output_dir().join("partial_sets")), ["p_00000000.png"]);
    Ok(())
}

#[test]
fn test_undo_at_start_then_retag() -> anyhow::Result<()> {
    let ws = Workspace::new(&SIDES);
    // undo at the first segment is ignored; the second undo revisits segment 2
    let mut presenter = ScriptedPresenter::new(session_keys("zcnzmc"));

    let summary = completed(Pipeline::open(ws.config())?.run(&mut presenter)?);

    assert_eq!(summary.correct.len(), 2);
    assert_eq!(summary.merged.len(), 1);
    assert!(summary.partial_sets.is_empty());
    Ok(())
}

#[test]
fn test_unknown_keys_are_ignored() -> anyhow::Result<()> {
    let ws = Workspace::new(&[20]);
    let mut presenter = ScriptedPresenter::new(['x', ' ', '7', ' ', 'k', 'c']);

    let summary = completed(Pipeline::open(ws.config())?.run(&mut presenter)?);

    assert_eq!(summary.correct.len(), 1);
    Ok(())
}

#[test]
fn test_accept_everything_gives_one_partial_set() -> anyhow::Result<()> {
    let ws = Workspace::new(&[24, 20, 16, 12]);
    let mut presenter = ScriptedPresenter::new(session_keys("ppppaaa"));

    let summary = completed(Pipeline::open(ws.config())?.run(&mut presenter)?);

    assert_eq!(summary.partial_sets.len(), 1);
    assert!(summary.correct.is_empty());

    // the set crop spans all four squares plus the margin
    let crop = image::open(&summary.partial_sets[0])?.to_rgb8();
    let (left, _) = square_origin(&[24, 20, 16, 12], 0);
    let (right, _) = square_origin(&[24, 20, 16, 12], 3);
    assert_eq!(crop.dimensions(), (right + 12 - left + 4, 24 + 4));
    Ok(())
}

#[test]
fn test_reject_round_then_complete_gives_singletons() -> anyhow::Result<()> {
    let ws = Workspace::new(&SIDES);
    // set 1 rejects both candidates, set 2 rejects its one, set 3 has none left
    let mut presenter = ScriptedPresenter::new(session_keys("ppprrcrc"));

    let summary = completed(Pipeline::open(ws.config())?.run(&mut presenter)?);

    assert_eq!(
        file_names(&ws.output_dir().join("partial_sets")),
        ["p_00000000.png", "p_00000001.png", "p_00000002.png"]
    );
    // singletons are ordered by seed, largest square first
    let first = image::open(&summary.partial_sets[0])?.to_rgb8();
    let last = image::open(&summary.partial_sets[2])?.to_rgb8();
    assert_eq!(first.dimensions(), (24, 24));
    assert_eq!(last.dimensions(), (16, 16));
    Ok(())
}

#[test]
fn test_exported_crop_is_masked_glyph() -> anyhow::Result<()> {
    let ws = Workspace::new(&[20]);
    let mut presenter = ScriptedPresenter::new(session_keys("c"));

    let summary = completed(Pipeline::open(ws.config())?.run(&mut presenter)?);

    let crop = image::open(&summary.correct[0])?.to_rgb8();
    assert_eq!(crop.dimensions(), (24, 24));
    assert_eq!(*crop.get_pixel(0, 0), PAGE);
    assert_eq!(*crop.get_pixel(2, 2), INK);
    assert_eq!(*crop.get_pixel(12, 12), INK);
    assert_eq!(*crop.get_pixel(23, 23), PAGE);
    Ok(())
}

#[test]
fn test_script_running_dry_is_an_error() -> anyhow::Result<()> {
    let ws = Workspace::new(&SIDES);
    let mut presenter = ScriptedPresenter::new(session_keys("c"));

    let err = Pipeline::open(ws.config())?.run(&mut presenter).unwrap_err();

    assert!(matches!(err, SegmenterError::Presenter(_)));
    assert!(file_names(&ws.output_dir()).is_empty());
    Ok(())
}

#[test]
fn test_debug_outputs_are_written() -> anyhow::Result<()> {
    let ws = Workspace::new(&SIDES);
    let debug_dir = ws.dir.path().join("debug");
    let mut presenter = ScriptedPresenter::new(session_keys("nnn"));

    let summary = completed(
        Pipeline::open(ws.config())?
            .with_debug(debug_dir.clone())?
            .run(&mut presenter)?,
    );

    assert_eq!(summary.total(), 0);
    assert_eq!(
        file_names(&debug_dir),
        ["01_threshold_mask.png", "02_segmentation.png"]
    );
    Ok(())
}
