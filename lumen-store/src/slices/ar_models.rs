//! AR model list for the viewer

use crate::action::{Action, SliceKey};
use crate::models::ArModel;
use crate::resource::AsyncResource;
use crate::slice::{Slice, SliceActionOf};
use crate::store::RootState;
use std::sync::Arc;

pub struct ArModelsSlice;

#[derive(Debug, Clone, PartialEq)]
pub enum ArModelsLocal {
    Select(String),
}

impl Slice for ArModelsSlice {
    const KEY: SliceKey = SliceKey::ArModels;
    type Data = Vec<ArModel>;
    type Local = ArModelsLocal;

    fn reduce_local(data: &Vec<ArModel>, action: &ArModelsLocal) -> Option<Vec<ArModel>> {
        match action {
            ArModelsLocal::Select(id) => {
                if !data.iter().any(|m| &m.id == id) {
                    return None;
                }
                Some(
                    data.iter()
                        .map(|m| ArModel {
                            selected: &m.id == id,
                            ..m.clone()
                        })
                        .collect(),
                )
            }
        }
    }

    fn wrap(action: SliceActionOf<Self>) -> Action {
        Action::ArModels(action)
    }

    fn select(state: &RootState) -> &Arc<AsyncResource<Vec<ArModel>>> {
        &state.ar_models
    }
}
