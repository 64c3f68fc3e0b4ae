mod common;
use common::*;

use glyphseg::core::ProgressStore;
use glyphseg::core::progress::load_session;

const SIDES: [u32; 3] = [20, 16, 12];

#[test]
fn test_quit_during_tagging_then_resume() -> anyhow::Result<()> {
    let ws = Workspace::new(&SIDES);
    let mut presenter = ScriptedPresenter::new(session_keys("cq"));

    let outcome = Pipeline::open(ws.config())?
        .with_progress_file(ws.progress_path())
        .run(&mut presenter)?;
    assert_eq!(
        outcome,
        RunOutcome::Interrupted {
            stage: Stage::SegmentTagging { cursor: 1 }
        }
    );
    assert!(file_names(&ws.output_dir()).is_empty());

    let session = load_session(&ws.progress_path())?;
    assert_eq!(session.stage, Stage::SegmentTagging { cursor: 1 });
    assert_eq!(session.collections.todo.len(), 3);
    assert_eq!(session.collections.todo[0].tag(), Tag::Correct);
    assert_eq!(session.collections.todo[1].tag(), Tag::Undefined);

    let mut presenter = ScriptedPresenter::new(['m', 'c']);
    let outcome = Pipeline::from_session(session)?
        .with_progress_file(ws.progress_path())
        .run(&mut presenter)?;

    let RunOutcome::Completed(summary) = outcome else {
        panic!("resumed session did not complete: {:?}", outcome);
    };
    assert_eq!(summary.correct.len(), 2);
    assert_eq!(summary.merged.len(), 1);
    assert_eq!(presenter.remaining(), 0);
    Ok(())
}

#[test]
fn test_quit_mid_set_keeps_working_set() -> anyhow::Result<()> {
    let ws = Workspace::new(&SIDES);
    let mut presenter = ScriptedPresenter::new(session_keys("pppaq"));

    Pipeline::open(ws.config())?
        .with_progress_file(ws.progress_path())
        .run(&mut presenter)?;

    let session = load_session(&ws.progress_path())?;
    let Stage::SegmentMerging {
        working_set: Some(set),
        pointer,
    } = &session.stage
    else {
        panic!("unexpected stage {:?}", session.stage);
    };
    assert_eq!(set.len(), 2);
    assert_eq!(*pointer, 0);
    assert_eq!(session.collections.todo.len(), 1);

    // close the open set; the last fragment becomes a singleton
    let mut presenter = ScriptedPresenter::new(['c']);
    let outcome = Pipeline::from_session(session)?.run(&mut presenter)?;

    let RunOutcome::Completed(summary) = outcome else {
        panic!("resumed session did not complete: {:?}", outcome);
    };
    assert_eq!(summary.partial_sets.len(), 2);
    let pair = image::open(&summary.partial_sets[0])?.to_rgb8();
    let single = image::open(&summary.partial_sets[1])?.to_rgb8();
    assert!(pair.width() > single.width());
    Ok(())
}

#[test]
fn test_save_mid_set_keeps_working_set() -> anyhow::Result<()> {
    let ws = Workspace::new(&SIDES);
    // the script runs dry right after the save, so no later checkpoint lands
    let mut presenter = ScriptedPresenter::new(session_keys("pppas"));

    let err = Pipeline::open(ws.config())?
        .with_progress_file(ws.progress_path())
        .run(&mut presenter)
        .unwrap_err();
    assert!(matches!(err, SegmenterError::Presenter(_)));

    let session = load_session(&ws.progress_path())?;
    let Stage::SegmentMerging {
        working_set: Some(set),
        pointer,
    } = &session.stage
    else {
        panic!("unexpected stage {:?}", session.stage);
    };
    assert_eq!(set.len(), 2);
    assert_eq!(*pointer, 0);
    assert_eq!(session.collections.todo.len(), 1);
    assert!(session.collections.partial_sets.is_empty());

    let mut presenter = ScriptedPresenter::new(['c']);
    let outcome = Pipeline::from_session(session)?.run(&mut presenter)?;
    let RunOutcome::Completed(summary) = outcome else {
        panic!("resumed session did not complete: {:?}", outcome);
    };
    assert_eq!(summary.partial_sets.len(), 2);
    Ok(())
}

#[test]
fn test_save_mid_set_does_not_disturb_merging() -> anyhow::Result<()> {
    let ws = Workspace::new(&SIDES);
    let mut presenter = ScriptedPresenter::new(session_keys("pppasc"));

    let outcome = Pipeline::open(ws.config())?
        .with_progress_file(ws.progress_path())
        .run(&mut presenter)?;

    let RunOutcome::Completed(summary) = outcome else {
        panic!("session did not complete: {:?}", outcome);
    };
    assert_eq!(summary.partial_sets.len(), 2);
    assert_eq!(presenter.remaining(), 0);

    let completed: Vec<&String> = presenter
        .announcements()
        .iter()
        .filter(|a| a.contains("PARTIAL SET COMPLETED"))
        .collect();
    assert_eq!(completed.len(), 2);
    assert!(completed[1].contains("no partial segments left"));

    let session = load_session(&ws.progress_path())?;
    assert_eq!(session.stage, Stage::Complete);
    assert_eq!(session.collections.partial_sets.len(), 2);
    assert_eq!(session.collections.partial_sets[0].len(), 2);
    Ok(())
}

#[test]
fn test_save_key_writes_snapshot_and_continues() -> anyhow::Result<()> {
    let ws = Workspace::new(&SIDES);
    let mut presenter = ScriptedPresenter::new(session_keys("csnn"));

    Pipeline::open(ws.config())?
        .with_progress_file(ws.progress_path())
        .run(&mut presenter)?;

    // the final checkpoint overwrites the mid-tagging save
    let session = load_session(&ws.progress_path())?;
    assert_eq!(session.stage, Stage::Complete);
    assert_eq!(session.collections.correct.len(), 1);
    assert!(session.collections.todo.is_empty());
    Ok(())
}

#[test]
fn test_quit_at_preview_resumes_at_same_step() -> anyhow::Result<()> {
    let ws = Workspace::new(&SIDES);
    let mut presenter = ScriptedPresenter::new([' ', 'q']);

    let outcome = Pipeline::open(ws.config())?
        .with_progress_file(ws.progress_path())
        .run(&mut presenter)?;
    assert_eq!(
        outcome,
        RunOutcome::Interrupted {
            stage: Stage::SegmentDetection
        }
    );

    // detection reruns from the image since the mask is not stored
    let session = load_session(&ws.progress_path())?;
    let mut presenter = ScriptedPresenter::new(" ccc".chars());
    let outcome = Pipeline::from_session(session)?.run(&mut presenter)?;
    assert!(matches!(outcome, RunOutcome::Completed(ref s) if s.correct.len() == 3));
    Ok(())
}

#[test]
fn test_stored_config_is_used_on_resume() -> anyhow::Result<()> {
    let ws = Workspace::new(&SIDES);
    let config = ws.config().with_min_area(150);
    let mut presenter = ScriptedPresenter::new(session_keys("q"));

    Pipeline::open(config)?
        .with_progress_file(ws.progress_path())
        .run(&mut presenter)?;

    let progress = ProgressStore::new(ws.progress_path()).load()?;
    assert_eq!(progress.config.min_area, 150);
    // only the two larger squares pass the area filter
    assert_eq!(progress.collections.todo.len(), 2);
    Ok(())
}

#[test]
fn test_resume_from_missing_file_fails() {
    let ws = Workspace::new(&SIDES);
    let err = load_session(&ws.progress_path()).unwrap_err();
    assert!(err.to_string().contains("Failed to load progress file"));
}
