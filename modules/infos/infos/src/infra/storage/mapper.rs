use infos_sdk::Info;

use crate::infra::storage::entity::Model as InfoEntity;

/// Convert a database entity to a contract model
impl From<InfoEntity> for Info {
    fn from(e: InfoEntity) -> Self {
        Self {
            id: e.id,
            title: e.title,
            desc: e.desc,
            is_complete: e.is_complete,
            remind_at_address: e.remind_at_address,
            remind_at_geo: e.remind_at_geo,
            tag: e.tag,
        }
    }
}
