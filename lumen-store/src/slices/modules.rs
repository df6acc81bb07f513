//! Modules of the subject being browsed
//!
//! The slice holds one subject's modules at a time. Fetching another subject
//! keeps the previous list visible until the new one arrives; dispatch
//! `ModulesSlice::reset()` first for a blank screen.

use crate::action::{Action, SliceKey};
use crate::models::Module;
use crate::resource::AsyncResource;
use crate::slice::{Slice, SliceActionOf};
use crate::store::RootState;
use std::sync::Arc;

pub struct ModulesSlice;

#[derive(Debug, Clone, PartialEq)]
pub enum ModulesLocal {
    MarkCompleted(String),
}

impl Slice for ModulesSlice {
    const KEY: SliceKey = SliceKey::Modules;
    type Data = Vec<Module>;
    type Local = ModulesLocal;

    fn reduce_local(data: &Vec<Module>, action: &ModulesLocal) -> Option<Vec<Module>> {
        match action {
            ModulesLocal::MarkCompleted(id) => {
                let index = data.iter().position(|m| &m.id == id)?;
                let mut next = data.clone();
                next[index].completed = true;
                Some(next)
            }
        }
    }

    fn wrap(action: SliceActionOf<Self>) -> Action {
        Action::Modules(action)
    }

    fn select(state: &RootState) -> &Arc<AsyncResource<Vec<Module>>> {
        &state.modules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_completed() {
        let modules = vec![
            Module {
                id: "m1".into(),
                ..Default::default()
            },
            Module {
                id: "m2".into(),
                ..Default::default()
            },
        ];
        let next = ModulesSlice::reduce_local(&modules, &ModulesLocal::MarkCompleted("m2".into())).unwrap();
        assert!(!next[0].completed);
        assert!(next[1].completed);
        assert!(ModulesSlice::reduce_local(&modules, &ModulesLocal::MarkCompleted("zz".into())).is_none());
    }
}
