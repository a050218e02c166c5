use crate::{AppError, HookCommand, HotkeyCombo, HotkeyRegistry};

use std::{collections::HashMap, path::PathBuf, sync::mpsc::Receiver};

fn registry(dir: &tempfile::TempDir) -> (HotkeyRegistry, Receiver<HookCommand>, PathBuf) {
    let path = dir.path().join("hotkeys.json");
    let (hook_tx, hook_rx) = std::sync::mpsc::channel();
    (HotkeyRegistry::new(path.clone(), hook_tx), hook_rx, path)
}

/// Desired sets shipped to the hook host so far, oldest first.
fn reinstalls(hook_rx: &Receiver<HookCommand>) -> Vec<Vec<(String, HotkeyCombo)>> {
    let mut sets = Vec::new();
    while let Ok(command) = hook_rx.try_recv() {
        if let HookCommand::Reinstall(bindings) = command {
            sets.push(bindings);
        }
    }
    sets
}

#[allow(clippy::unwrap_used)]
fn persisted(path: &PathBuf) -> HashMap<String, String> {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// WHAT: Assign persists the binding and ships the full desired hook set
/// WHY: The live hook set must always equal the persisted binding set
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_fresh_registry_when_assigning_then_persisted_and_reinstalled() {
    // Given: An empty registry
    let dir = tempfile::tempdir().unwrap();
    let (registry, hook_rx, path) = registry(&dir);

    // When: Assigning a hotkey (messy spelling)
    let canonical = registry.assign("greeting", "Ctrl + Alt + 1", true).await.unwrap();

    // Then: The canonical form is persisted
    assert_eq!(canonical, "ctrl+alt+1");
    assert_eq!(
        persisted(&path),
        HashMap::from([("greeting".to_string(), "ctrl+alt+1".to_string())])
    );

    // And: Exactly that set was shipped for installation
    let sets = reinstalls(&hook_rx);
    let last = sets.last().unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].0, "greeting");
    assert_eq!(last[0].1, HotkeyCombo::parse("ctrl+alt+1").unwrap());
}

/// WHAT: A combo held by a different macro is rejected
/// WHY: Two macros must never share a trigger
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_bound_combo_when_assigning_to_other_macro_then_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _hook_rx, path) = registry(&dir);
    registry.assign("first", "ctrl+alt+1", true).await.unwrap();

    // When: Binding the same combo to a second macro
    let result = registry.assign("second", "ctrl+alt+1", true).await;

    // Then: Rejected, and the persisted set is unchanged
    assert!(matches!(
        result,
        Err(AppError::DuplicateHotkey { ref bound_to, .. }) if bound_to == "first"
    ));
    assert_eq!(
        persisted(&path),
        HashMap::from([("first".to_string(), "ctrl+alt+1".to_string())])
    );
}

/// WHAT: Re-assigning a macro its own combo is not a duplicate
/// WHY: Only a *different* macro holding the combo is a collision
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_own_combo_when_reassigning_then_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _hook_rx, _path) = registry(&dir);
    registry.assign("solo", "ctrl+alt+1", true).await.unwrap();

    assert!(registry.assign("solo", "ctrl+alt+1", true).await.is_ok());
}

/// WHAT: Rebind stores and persists the replacement combo
/// WHY: A rebind that never lands in the mapping would silently keep the
///      old trigger
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_bound_macro_when_rebinding_then_replacement_persisted() {
    // Given: A macro bound to ctrl+alt+1
    let dir = tempfile::tempdir().unwrap();
    let (registry, hook_rx, path) = registry(&dir);
    registry.assign("task", "ctrl+alt+1", true).await.unwrap();

    // When: Rebinding to ctrl+alt+2
    let canonical = registry.rebind("task", "ctrl+alt+2").await.unwrap();

    // Then: The replacement is in memory, on disk, and in the shipped set
    assert_eq!(canonical, "ctrl+alt+2");
    assert_eq!(registry.binding_for("task").await, Some("ctrl+alt+2".into()));
    assert_eq!(
        persisted(&path),
        HashMap::from([("task".to_string(), "ctrl+alt+2".to_string())])
    );

    let sets = reinstalls(&hook_rx);
    let last = sets.last().unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].1, HotkeyCombo::parse("ctrl+alt+2").unwrap());
}

/// WHAT: Rename moves the binding to the new name and reinstalls
/// WHY: A binding referencing a renamed macro would trigger a dead name
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_bound_macro_when_renamed_then_binding_migrated() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, hook_rx, path) = registry(&dir);
    registry.assign("old", "ctrl+alt+3", true).await.unwrap();

    let migrated = registry.handle_rename("old", "new").await.unwrap();

    assert!(migrated);
    assert_eq!(
        persisted(&path),
        HashMap::from([("new".to_string(), "ctrl+alt+3".to_string())])
    );
    let sets = reinstalls(&hook_rx);
    let last = sets.last().unwrap();
    assert_eq!(last[0].0, "new");
}

/// WHAT: Renaming an unbound macro is a no-op for the registry
/// WHY: Only macros with bindings need migration
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_unbound_macro_when_renamed_then_nothing_migrated() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, hook_rx, path) = registry(&dir);

    let migrated = registry.handle_rename("old", "new").await.unwrap();

    assert!(!migrated);
    assert!(!path.exists(), "no binding file should be created");
    assert!(reinstalls(&hook_rx).is_empty(), "no reinstall should run");
}

/// WHAT: Startup binding installs persisted entries without rewriting them
/// WHY: Bind-all-from-storage must not churn the binding file
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_persisted_bindings_when_binding_all_then_installed_not_rewritten() {
    // Given: A hand-written binding file
    let dir = tempfile::tempdir().unwrap();
    let (registry, hook_rx, path) = registry(&dir);
    let raw = r#"{"alpha":"ctrl+alt+1","beta":"shift+f5"}"#;
    std::fs::write(&path, raw).unwrap();

    // When: Binding all from storage
    registry.bind_all_from_storage().await.unwrap();

    // Then: Both entries shipped for installation
    let sets = reinstalls(&hook_rx);
    let mut names: Vec<String> = sets.last().unwrap().iter().map(|(n, _)| n.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["alpha", "beta"]);

    // And: The file was not rewritten
    assert_eq!(std::fs::read_to_string(&path).unwrap(), raw);
}

/// WHAT: A missing binding file reads as an empty set
/// WHY: First launch has no bindings and must not error
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_binding_file_when_loading_then_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _hook_rx, _path) = registry(&dir);

    assert!(registry.load_all().unwrap().is_empty());
}

/// WHAT: After a mutation sequence, the shipped set equals the persisted set
/// WHY: No orphan hooks, no duplicates, across assign/rebind/rename
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_mutation_sequence_when_done_then_live_set_matches_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, hook_rx, path) = registry(&dir);

    registry.assign("a", "ctrl+alt+1", true).await.unwrap();
    registry.assign("b", "ctrl+alt+2", true).await.unwrap();
    registry.rebind("a", "ctrl+alt+3").await.unwrap();
    registry.handle_rename("b", "c").await.unwrap();

    let shipped: HashMap<String, String> = reinstalls(&hook_rx)
        .last()
        .unwrap()
        .iter()
        .map(|(name, combo)| (name.clone(), combo.canonical()))
        .collect();

    assert_eq!(shipped, persisted(&path));
    assert_eq!(
        shipped,
        HashMap::from([
            ("a".to_string(), "ctrl+alt+3".to_string()),
            ("c".to_string(), "ctrl+alt+2".to_string()),
        ])
    );
}
