//! Property tests for draft bookkeeping.
//!
//! The draft must keep two promises under any interleaving of selection
//! operations: running totals always equal the sum over current lines, and
//! no item is ever selected beyond its snapshot stock.

use proptest::prelude::*;

use clinica_core::composer::ConsultationDraft;
use clinica_core::models::InventoryItem;

const ITEM_IDS: [&str; 3] = ["med-a", "med-b", "med-c"];

fn snapshot() -> Vec<InventoryItem> {
    let specs = [
        ("med-a", "Paracetamol 500mg", 5, 2.5),
        ("med-b", "Amoxicilina 500mg", 3, 10.0),
        ("med-c", "Suero oral", 0, 7.0),
    ];
    specs
        .into_iter()
        .map(|(id, name, quantity, price)| {
            let mut item = InventoryItem::new(name.into(), quantity, price);
            item.id = id.into();
            item
        })
        .collect()
}

#[derive(Debug, Clone)]
enum Op {
    Add(usize, i64),
    Remove(usize),
    Update(usize, i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ITEM_IDS.len(), -1i64..8).prop_map(|(i, q)| Op::Add(i, q)),
        (0..ITEM_IDS.len()).prop_map(Op::Remove),
        (0..ITEM_IDS.len(), -1i64..8).prop_map(|(i, q)| Op::Update(i, q)),
    ]
}

proptest! {
    #[test]
    fn totals_and_stock_bounds_hold(
        ops in prop::collection::vec(op_strategy(), 0..50),
        fee in 1.0f64..500.0,
    ) {
        let items = snapshot();
        let mut draft = ConsultationDraft::new("patient-1".into(), items.clone());
        draft.consultation_price = fee;

        for op in ops {
            // Rejected operations must leave the draft unchanged; totals are
            // re-checked after every step either way.
            let _ = match op {
                Op::Add(i, q) => draft.add_medication(ITEM_IDS[i], q).is_ok(),
                Op::Remove(i) => draft.remove_medication(ITEM_IDS[i]),
                Op::Update(i, q) => draft.update_medication_quantity(ITEM_IDS[i], q).is_ok(),
            };

            let expected: f64 = draft
                .medications()
                .iter()
                .map(|m| m.price * m.quantity as f64)
                .sum();
            prop_assert!((draft.medications_total() - expected).abs() < 1e-9);
            prop_assert!((draft.grand_total() - (fee + expected)).abs() < 1e-9);

            for item in &items {
                let selected = draft.selected_quantity(&item.id);
                prop_assert!(selected >= 0);
                prop_assert!(selected <= item.quantity);
                prop_assert_eq!(draft.remaining_quantity(&item.id), item.quantity - selected);
            }

            // One line per distinct item, and never an empty line
            for line in draft.medications() {
                prop_assert!(line.quantity >= 1);
            }
            let mut ids: Vec<&str> = draft.medications().iter().map(|m| m.id.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), draft.medications().len());
        }
    }

    #[test]
    fn out_of_stock_item_is_never_selectable(quantity in 1i64..20) {
        let items = snapshot();
        let mut draft = ConsultationDraft::new("patient-1".into(), items);

        // med-c has zero stock in the snapshot
        prop_assert!(draft.add_medication("med-c", quantity).is_err());
        prop_assert_eq!(draft.selected_quantity("med-c"), 0);
    }
}
