use listkit::{ChoiceMode, Item, ListConfig, ListError, ListModel, ListObserver};
use std::cell::RefCell;
use std::rc::Rc;

/// Collects selection changes as `(index, selected)`.
struct SelectionLog(Rc<RefCell<Vec<(usize, bool)>>>);

impl ListObserver<&'static str> for SelectionLog {
    fn on_item_selected(&mut self, _item: &&'static str, index: usize) {
        self.0.borrow_mut().push((index, true));
    }

    fn on_item_unselected(&mut self, _item: &&'static str, index: usize) {
        self.0.borrow_mut().push((index, false));
    }
}

fn single_choice(data: &[&'static str]) -> ListModel<&'static str> {
    let config = ListConfig {
        choice_mode: ChoiceMode::Single,
        adapt_selection_automatically: true,
        ..ListConfig::default()
    };
    let mut model = ListModel::filterable();
    model.apply_config(&config).unwrap();
    model.add_all(data.iter().copied()).unwrap();
    model
}

#[test]
fn test_single_choice_follows_enable_and_filter() {
    let mut model = single_choice(&["A", "B", "C"]);
    assert_eq!(model.selected_item(), Some(&"A"));

    model.set_enabled(0, false).unwrap();
    assert_eq!(model.selected_item(), Some(&"B"));

    let visible = model.apply_filter("C", 0, None).unwrap();
    assert_eq!(visible, Some(vec![2]));
    assert_eq!(model.selected_item(), Some(&"C"));

    assert!(model.reset_filter("C", 0));
    assert_eq!(model.visible_items(), vec![&"A", &"B", &"C"]);
    assert!(!model.is_enabled(0).unwrap());
    assert_eq!(model.selected_item(), Some(&"C"));
    assert_eq!(model.selected_count(), 1);
}

#[test]
fn test_multiple_choice_disable_clears_selection() {
    let mut model = ListModel::new();
    model.set_choice_mode(ChoiceMode::Multiple);
    model.add_all(["X", "Y", "Z"]).unwrap();

    model.set_selected(1, true).unwrap();
    model.set_enabled(1, false).unwrap();

    assert!(!model.is_selected(1).unwrap());
}

#[test]
fn test_nearest_enabled_search_alternates_from_vacated_index() {
    let mut model = single_choice(&["0", "1", "2", "3", "4"]);
    model.set_enabled(1, false).unwrap();
    model.set_enabled(3, false).unwrap();
    model.select(2).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    model.add_observer(Box::new(SelectionLog(log.clone())));

    // Visits 3 (disabled), 1 (disabled), then 4
    model.set_enabled(2, false).unwrap();

    assert_eq!(model.selected_indices(), vec![4]);
    assert_eq!(*log.borrow(), vec![(2, false), (4, true)]);
}

#[test]
fn test_nearest_search_skips_filtered_items() {
    let mut model = single_choice(&["a1", "b2", "a3", "b4"]);
    model.apply_filter("a", 0, None).unwrap();
    model.select(2).unwrap();

    model.set_enabled(2, false).unwrap();

    // 3 and 1 are hidden, 0 is the nearest visible enabled item
    assert_eq!(model.selected_indices(), vec![0]);
}

#[test]
fn test_reapplying_filter_is_a_noop() {
    let mut model = single_choice(&["apple", "banana", "cherry"]);
    let first = model.apply_filter("an", 0, None).unwrap();
    let second = model.apply_filter("an", 0, None).unwrap();

    assert_eq!(first, Some(vec![1]));
    assert_eq!(second, None);
    assert_eq!(model.visible_indices(), &[1]);
    assert_eq!(model.active_filters().len(), 1);
}

#[test]
fn test_replace_recomputes_visible_subset() {
    let mut model = ListModel::filterable();
    model.add_all(["apple", "banana"]).unwrap();
    model.apply_filter("an", 0, None).unwrap();

    model.replace_at(0, "mango").unwrap();
    assert_eq!(model.visible_items(), vec![&"mango", &"banana"]);

    model.reset_filter("an", 0);
    model.apply_filter("ban", 0, None).unwrap();
    assert_eq!(model.visible_items(), vec![&"banana"]);
}

#[test]
fn test_master_order_unaffected_by_filters() {
    let mut model = ListModel::filterable();
    model.add_all(["delta", "alpha", "charlie", "bravo"]).unwrap();
    model.apply_filter("a", 0, None).unwrap();
    model.apply_filter("l", 0, None).unwrap();
    model.remove_at(0).unwrap();
    model.add_at(1, "echo").unwrap();

    assert_eq!(
        model.all_items(),
        vec![&"alpha", &"echo", &"charlie", &"bravo"]
    );
    assert_eq!(model.visible_items(), vec![&"alpha", &"charlie"]);
}

#[test]
fn test_rejected_calls_leave_model_untouched() {
    let mut model = single_choice(&["a", "b"]);
    let before = model.snapshot();

    assert!(matches!(
        model.set_state(0, 1),
        Err(ListError::InvalidArgument(_))
    ));
    assert!(matches!(
        model.set_enabled(9, false),
        Err(ListError::IndexOutOfRange { index: 9, len: 2 })
    ));
    assert!(matches!(
        model.set_selected(0, true),
        Err(ListError::IllegalState(_))
    ));
    assert!(matches!(
        model.insert_item(0, Item::new("c").with_state(4)),
        Err(ListError::InvalidArgument(_))
    ));

    assert_eq!(model.snapshot(), before);
}

#[test]
fn test_model_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.toml");
    std::fs::write(
        &path,
        "choice_mode = \"multiple\"\nnumber_of_states = 3\ntrigger_state_on_click = true\n",
    )
    .unwrap();

    let config = ListConfig::load(&path).unwrap();
    let mut model = ListModel::with_config(&config).unwrap();
    model.add_all([10, 20, 30]).unwrap();

    let outcome = model.on_item_clicked(1).unwrap();

    assert!(outcome.selection_changed);
    assert_eq!(outcome.previous_state, Some(0));
    assert_eq!(model.selected_items(), vec![&20]);
    assert_eq!(model.state(1).unwrap(), 1);
}
