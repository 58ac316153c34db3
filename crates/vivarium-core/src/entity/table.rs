//! Per-entity component table and paint order.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{ComponentError, SlotOccupied};

use super::components::{Collider, Component, ComponentTag, Sprite, TextLabel};

/// Paint order of an entity's drawable components, front to back.
///
/// Holds tags, not components: the table owns the components and the order
/// only says which slot is painted over which. A tag appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawOrder {
    order: VecDeque<ComponentTag>,
}

impl DrawOrder {
    /// Creates an empty order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tag` at the front. No-op if already registered.
    pub fn register(&mut self, tag: ComponentTag) {
        if !self.contains(tag) {
            self.order.push_front(tag);
        }
    }

    /// Unregisters `tag`. Returns `false` if it was not registered.
    pub fn unregister(&mut self, tag: ComponentTag) -> bool {
        match self.position(tag) {
            Some(index) => {
                self.order.remove(index);
                true
            }
            None => false,
        }
    }

    /// Registers `tag` at `index` from the front, clamped to the end.
    /// No-op if already registered.
    pub fn register_at(&mut self, tag: ComponentTag, index: usize) {
        if !self.contains(tag) {
            self.order.insert(index.min(self.order.len()), tag);
        }
    }

    /// Moves `tag` to the front. Returns `false` if it is not registered.
    pub fn send_to_front(&mut self, tag: ComponentTag) -> bool {
        if !self.unregister(tag) {
            return false;
        }
        self.order.push_front(tag);
        true
    }

    /// Moves `tag` to the back. Returns `false` if it is not registered.
    pub fn send_to_back(&mut self, tag: ComponentTag) -> bool {
        if !self.unregister(tag) {
            return false;
        }
        self.order.push_back(tag);
        true
    }

    /// Returns `true` if `tag` is registered.
    #[must_use]
    pub fn contains(&self, tag: ComponentTag) -> bool {
        self.order.contains(&tag)
    }

    /// Index of `tag` counted from the front.
    #[must_use]
    pub fn position(&self, tag: ComponentTag) -> Option<usize> {
        self.order.iter().position(|&t| t == tag)
    }

    /// Registered tags, front to back.
    pub fn iter(&self) -> impl Iterator<Item = ComponentTag> + '_ {
        self.order.iter().copied()
    }

    /// Number of registered tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Unregisters everything.
    pub fn clear(&mut self) {
        self.order.clear();
    }
}

/// Which side of a swap lacked the component.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapSide {
    /// The first table
    First,
    /// The second table
    Second,
}

impl std::fmt::Display for SwapSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Second => write!(f, "second"),
        }
    }
}

/// Fixed set of component slots, one per [`ComponentTag`].
///
/// Invariants:
/// - at most one component per tag, and the component in a slot always has
///   that slot's tag
/// - a drawable is registered in the [`DrawOrder`] exactly while its slot is
///   occupied; non-drawables never are
///
/// A drawable taken out keeps a claim on its paint-order position, so
/// extracting and re-inserting it leaves the table as it was. A drawable
/// entering a slot for the first time goes to the front.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentTable {
    slots: [Option<Component>; ComponentTag::COUNT],
    draw_order: DrawOrder,
    #[serde(default)]
    vacated: [Option<usize>; ComponentTag::COUNT],
}

impl ComponentTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `component` in its slot if that slot is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SlotOccupied`] with the rejected component when the slot is
    /// taken. The table is not modified.
    pub fn insert(&mut self, component: Component) -> Result<(), SlotOccupied> {
        let tag = component.tag();
        if self.has(tag) {
            return Err(SlotOccupied { tag, component });
        }
        self.force_insert(component);
        Ok(())
    }

    /// Stores `component`, returning the previous occupant of its slot.
    ///
    /// A replaced drawable keeps its paint-order position; a returning one
    /// gets back the position it was extracted from.
    pub fn force_insert(&mut self, component: Component) -> Option<Component> {
        let tag = component.tag();
        let previous = self.slots[tag.index()].replace(component);
        let vacated = self.vacated[tag.index()].take();
        if tag.is_drawable() {
            match vacated {
                Some(index) => self.draw_order.register_at(tag, index),
                None => self.draw_order.register(tag),
            }
        }
        previous
    }

    /// Destroys the component in `tag`'s slot. Returns `false` if empty.
    pub fn remove(&mut self, tag: ComponentTag) -> bool {
        self.extract(tag).is_some()
    }

    /// Takes the component out of `tag`'s slot.
    pub fn extract(&mut self, tag: ComponentTag) -> Option<Component> {
        let taken = self.slots[tag.index()].take();
        if taken.is_some() {
            self.vacated[tag.index()] = self.draw_order.position(tag);
            self.draw_order.unregister(tag);
        }
        taken
    }

    /// Returns `true` if `tag`'s slot is occupied.
    #[must_use]
    pub fn has(&self, tag: ComponentTag) -> bool {
        self.slots[tag.index()].is_some()
    }

    /// Borrows the component in `tag`'s slot.
    #[must_use]
    pub fn see(&self, tag: ComponentTag) -> Option<&Component> {
        self.slots[tag.index()].as_ref()
    }

    /// Borrows the sprite.
    #[must_use]
    pub fn sprite(&self) -> Option<&Sprite> {
        self.see(ComponentTag::Sprite).and_then(Component::as_sprite)
    }

    /// Borrows the sprite mutably.
    #[must_use]
    pub fn sprite_mut(&mut self) -> Option<&mut Sprite> {
        match self.slots[ComponentTag::Sprite.index()].as_mut() {
            Some(Component::Sprite(sprite)) => Some(sprite),
            _ => None,
        }
    }

    /// Borrows the text label.
    #[must_use]
    pub fn text(&self) -> Option<&TextLabel> {
        self.see(ComponentTag::Text).and_then(Component::as_text)
    }

    /// Borrows the text label mutably.
    #[must_use]
    pub fn text_mut(&mut self) -> Option<&mut TextLabel> {
        match self.slots[ComponentTag::Text.index()].as_mut() {
            Some(Component::Text(label)) => Some(label),
            _ => None,
        }
    }

    /// Borrows the collider.
    #[must_use]
    pub fn collider(&self) -> Option<&Collider> {
        self.see(ComponentTag::Collider).and_then(Component::as_collider)
    }

    /// Borrows the collider mutably.
    #[must_use]
    pub fn collider_mut(&mut self) -> Option<&mut Collider> {
        match self.slots[ComponentTag::Collider.index()].as_mut() {
            Some(Component::Collider(collider)) => Some(collider),
            _ => None,
        }
    }

    /// Exchanges the `tag` components of two tables.
    ///
    /// Paint-order positions stay with the tables, not the components.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Missing`] naming the side that lacks the
    /// component; both tables are left unchanged.
    pub fn swap_component(tag: ComponentTag, a: &mut Self, b: &mut Self) -> Result<(), ComponentError> {
        if !a.has(tag) {
            return Err(ComponentError::Missing { tag, side: SwapSide::First });
        }
        if !b.has(tag) {
            return Err(ComponentError::Missing { tag, side: SwapSide::Second });
        }
        std::mem::swap(&mut a.slots[tag.index()], &mut b.slots[tag.index()]);
        Ok(())
    }

    /// Moves a registered drawable to the front of the paint order.
    pub fn send_to_front(&mut self, tag: ComponentTag) -> bool {
        self.draw_order.send_to_front(tag)
    }

    /// Moves a registered drawable to the back of the paint order.
    pub fn send_to_back(&mut self, tag: ComponentTag) -> bool {
        self.draw_order.send_to_back(tag)
    }

    /// Paint order of the drawables.
    #[must_use]
    pub fn draw_order(&self) -> &DrawOrder {
        &self.draw_order
    }

    /// Drawable components, front to back.
    pub fn drawables(&self) -> impl Iterator<Item = &Component> + '_ {
        self.draw_order.iter().filter_map(move |tag| self.see(tag))
    }

    /// Occupied tags in slot order.
    pub fn tags(&self) -> impl Iterator<Item = ComponentTag> + '_ {
        ComponentTag::ALL.into_iter().filter(move |&tag| self.has(tag))
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True if no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Destroys every component and clears the paint order.
    pub fn purge(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.vacated = [None; ComponentTag::COUNT];
        self.draw_order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::ColliderType;
    use crate::entity::EntityId;
    use crate::resources::{ResourceHandle, ResourceKind};
    use proptest::prelude::*;

    fn sprite(name: &str) -> Component {
        Sprite::new(ResourceHandle::new(ResourceKind::Texture, name, 0)).into()
    }

    fn label(text: &str) -> Component {
        TextLabel::new(ResourceHandle::new(ResourceKind::Font, "mono", 0), text).into()
    }

    fn collider() -> Component {
        Collider::new(EntityId::new(1), ColliderType::Organism, 4.0).into()
    }

    fn order(table: &ComponentTable) -> Vec<ComponentTag> {
        table.draw_order().iter().collect()
    }

    mod insert_tests {
        use super::*;

        #[test]
        fn insert_into_empty_slot() {
            let mut table = ComponentTable::new();
            assert!(table.insert(sprite("a")).is_ok());
            assert!(table.has(ComponentTag::Sprite));
            assert_eq!(order(&table), vec![ComponentTag::Sprite]);
        }

        #[test]
        fn insert_into_occupied_slot_is_rejected() {
            let mut table = ComponentTable::new();
            table.insert(sprite("a")).expect("empty");

            let err = table.insert(sprite("b")).expect_err("occupied");
            assert_eq!(err.tag, ComponentTag::Sprite);
            assert_eq!(err.component, sprite("b"));
            assert_eq!(table.see(ComponentTag::Sprite), Some(&sprite("a")));
            assert_eq!(table.draw_order().len(), 1);
        }

        #[test]
        fn force_insert_returns_previous_and_keeps_position() {
            let mut table = ComponentTable::new();
            table.insert(sprite("a")).expect("empty");
            table.insert(label("name")).expect("empty");
            table.send_to_front(ComponentTag::Sprite);

            let previous = table.force_insert(sprite("b"));

            assert_eq!(previous, Some(sprite("a")));
            assert_eq!(order(&table), vec![ComponentTag::Sprite, ComponentTag::Text]);
        }

        #[test]
        fn newest_drawable_goes_in_front() {
            let mut table = ComponentTable::new();
            table.insert(sprite("a")).expect("empty");
            table.insert(label("name")).expect("empty");
            assert_eq!(order(&table), vec![ComponentTag::Text, ComponentTag::Sprite]);
        }

        #[test]
        fn collider_never_enters_draw_order() {
            let mut table = ComponentTable::new();
            table.insert(collider()).expect("empty");
            assert!(table.draw_order().is_empty());
            assert_eq!(table.drawables().count(), 0);
        }
    }

    mod remove_tests {
        use super::*;

        #[test]
        fn remove_reports_presence() {
            let mut table = ComponentTable::new();
            assert!(!table.remove(ComponentTag::Text));
            table.insert(label("x")).expect("empty");
            assert!(table.remove(ComponentTag::Text));
            assert!(!table.has(ComponentTag::Text));
            assert!(table.draw_order().is_empty());
        }

        #[test]
        fn extract_transfers_ownership() {
            let mut table = ComponentTable::new();
            table.insert(label("x")).expect("empty");
            assert_eq!(table.extract(ComponentTag::Text), Some(label("x")));
            assert_eq!(table.extract(ComponentTag::Text), None);
        }

        #[test]
        fn extract_then_insert_restores_table() {
            for tag in [ComponentTag::Sprite, ComponentTag::Text, ComponentTag::Collider] {
                let mut table = ComponentTable::new();
                table.insert(sprite("a")).expect("empty");
                table.insert(label("x")).expect("empty");
                table.insert(collider()).expect("empty");
                let before = table.clone();

                let taken = table.extract(tag).expect("occupied");
                table.insert(taken).expect("slot vacated");

                assert_eq!(table, before, "round trip through {tag}");
                assert_eq!(order(&table), vec![ComponentTag::Text, ComponentTag::Sprite]);
            }
        }

        #[test]
        fn returning_drawable_reclaims_position_after_reorder() {
            let mut table = ComponentTable::new();
            table.insert(sprite("a")).expect("empty");
            table.insert(label("x")).expect("empty");

            let back = table.extract(ComponentTag::Sprite).expect("occupied");
            table.insert(back).expect("slot vacated");
            assert_eq!(order(&table), vec![ComponentTag::Text, ComponentTag::Sprite]);

            let front = table.extract(ComponentTag::Text).expect("occupied");
            table.insert(front).expect("slot vacated");
            assert_eq!(order(&table), vec![ComponentTag::Text, ComponentTag::Sprite]);
        }

        #[test]
        fn purge_forgets_vacated_positions() {
            let mut table = ComponentTable::new();
            table.insert(sprite("a")).expect("empty");
            table.insert(label("x")).expect("empty");
            table.remove(ComponentTag::Sprite);
            table.purge();
            assert_eq!(table, ComponentTable::new());
        }

        #[test]
        fn purge_empties_everything() {
            let mut table = ComponentTable::new();
            table.insert(sprite("a")).expect("empty");
            table.insert(label("x")).expect("empty");
            table.insert(collider()).expect("empty");
            assert_eq!(table.len(), 3);

            table.purge();
            assert!(table.is_empty());
            assert!(table.draw_order().is_empty());
        }
    }

    mod order_tests {
        use super::*;

        #[test]
        fn send_to_back_and_front() {
            let mut table = ComponentTable::new();
            table.insert(sprite("a")).expect("empty");
            table.insert(label("x")).expect("empty");

            assert!(table.send_to_back(ComponentTag::Text));
            assert_eq!(order(&table), vec![ComponentTag::Sprite, ComponentTag::Text]);
            assert!(table.send_to_front(ComponentTag::Text));
            assert_eq!(order(&table), vec![ComponentTag::Text, ComponentTag::Sprite]);
        }

        #[test]
        fn reorder_of_unregistered_tag_fails() {
            let mut table = ComponentTable::new();
            table.insert(collider()).expect("empty");
            assert!(!table.send_to_front(ComponentTag::Collider));
            assert!(!table.send_to_back(ComponentTag::Sprite));
        }

        #[test]
        fn drawables_follow_order() {
            let mut table = ComponentTable::new();
            table.insert(sprite("a")).expect("empty");
            table.insert(label("x")).expect("empty");
            let tags: Vec<_> = table.drawables().map(Component::tag).collect();
            assert_eq!(tags, vec![ComponentTag::Text, ComponentTag::Sprite]);
        }
    }

    mod swap_tests {
        use super::*;

        #[test]
        fn swap_exchanges_components_not_positions() {
            let mut a = ComponentTable::new();
            let mut b = ComponentTable::new();
            a.insert(sprite("a")).expect("empty");
            a.insert(label("a")).expect("empty");
            b.insert(label("b")).expect("empty");
            b.insert(sprite("b")).expect("empty");

            ComponentTable::swap_component(ComponentTag::Sprite, &mut a, &mut b).expect("both");

            assert_eq!(a.sprite(), sprite("b").as_sprite());
            assert_eq!(b.sprite(), sprite("a").as_sprite());
            assert_eq!(order(&a), vec![ComponentTag::Text, ComponentTag::Sprite]);
            assert_eq!(order(&b), vec![ComponentTag::Sprite, ComponentTag::Text]);
        }

        #[test]
        fn swap_reports_missing_side() {
            let mut a = ComponentTable::new();
            let mut b = ComponentTable::new();
            b.insert(sprite("b")).expect("empty");

            let err = ComponentTable::swap_component(ComponentTag::Sprite, &mut a, &mut b);
            assert_eq!(
                err,
                Err(ComponentError::Missing { tag: ComponentTag::Sprite, side: SwapSide::First })
            );
            assert!(b.has(ComponentTag::Sprite));

            let err = ComponentTable::swap_component(ComponentTag::Sprite, &mut b, &mut a);
            assert_eq!(
                err,
                Err(ComponentError::Missing { tag: ComponentTag::Sprite, side: SwapSide::Second })
            );
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(usize),
        Force(usize),
        Remove(usize),
        Front(usize),
        Back(usize),
        Purge,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..3_usize).prop_map(Op::Insert),
            (0..3_usize).prop_map(Op::Force),
            (0..3_usize).prop_map(Op::Remove),
            (0..3_usize).prop_map(Op::Front),
            (0..3_usize).prop_map(Op::Back),
            Just(Op::Purge),
        ]
    }

    fn make(tag: ComponentTag) -> Component {
        match tag {
            ComponentTag::Sprite => sprite("s"),
            ComponentTag::Text => label("t"),
            ComponentTag::Collider => collider(),
        }
    }

    proptest! {
        #[test]
        fn draw_order_mirrors_drawable_slots(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut table = ComponentTable::new();
            for op in ops {
                match op {
                    Op::Insert(i) => { let _ = table.insert(make(ComponentTag::ALL[i])); }
                    Op::Force(i) => { table.force_insert(make(ComponentTag::ALL[i])); }
                    Op::Remove(i) => { table.remove(ComponentTag::ALL[i]); }
                    Op::Front(i) => { table.send_to_front(ComponentTag::ALL[i]); }
                    Op::Back(i) => { table.send_to_back(ComponentTag::ALL[i]); }
                    Op::Purge => table.purge(),
                }

                for tag in ComponentTag::ALL {
                    let registered = table.draw_order().contains(tag);
                    prop_assert_eq!(registered, tag.is_drawable() && table.has(tag));
                    if let Some(component) = table.see(tag) {
                        prop_assert_eq!(component.tag(), tag);
                    }
                }
                prop_assert!(table.draw_order().len() <= 2);
            }
        }

        #[test]
        fn extract_insert_round_trip_is_identity(
            ops in prop::collection::vec(op_strategy(), 0..32),
            pick in 0..3_usize,
        ) {
            let mut table = ComponentTable::new();
            for op in ops {
                match op {
                    Op::Insert(i) => { let _ = table.insert(make(ComponentTag::ALL[i])); }
                    Op::Force(i) => { table.force_insert(make(ComponentTag::ALL[i])); }
                    Op::Remove(i) => { table.remove(ComponentTag::ALL[i]); }
                    Op::Front(i) => { table.send_to_front(ComponentTag::ALL[i]); }
                    Op::Back(i) => { table.send_to_back(ComponentTag::ALL[i]); }
                    Op::Purge => table.purge(),
                }
            }
            let tag = ComponentTag::ALL[pick];
            let before_order = order(&table);
            let before_slots: Vec<_> = ComponentTag::ALL.iter().map(|&t| table.see(t).cloned()).collect();
            if let Some(taken) = table.extract(tag) {
                prop_assert!(table.insert(taken).is_ok());
            }
            let after_slots: Vec<_> = ComponentTag::ALL.iter().map(|&t| table.see(t).cloned()).collect();
            prop_assert_eq!(order(&table), before_order);
            prop_assert_eq!(after_slots, before_slots);
        }
    }
}
