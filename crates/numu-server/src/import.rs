use std::collections::HashMap;

use tracing::{info, warn};

use numu_api::AppState;
use numu_remote::rows::equipment_from_row;
use numu_remote::{EQUIPMENT, Order, USERS};

/// Pulls hosted listings that are not in the local catalog yet.
/// Returns how many were added.
pub async fn import_remote_catalog(state: &AppState) -> usize {
    let rows = match state
        .remote
        .select(EQUIPMENT, &[], Some(&Order::desc("created_at")))
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Remote catalog import skipped: {}", e);
            return 0;
        }
    };

    // Listings rows carry only the owner id.
    let owner_names: HashMap<String, String> = match state.remote.select(USERS, &[], None).await {
        Ok(users) => users
            .iter()
            .filter_map(|u| Some((u["id"].as_str()?.to_string(), u["name"].as_str()?.to_string())))
            .collect(),
        Err(e) => {
            warn!("Remote owner names unavailable: {}", e);
            HashMap::new()
        }
    };

    let mut market = state.market.write().await;
    let mut added = 0;
    // Oldest first so the newest ends up at the front of the catalog.
    for row in rows.into_iter().rev() {
        let owner = row["owner_id"].as_str().and_then(|id| owner_names.get(id)).cloned();
        match equipment_from_row(row, owner.as_deref().unwrap_or_default()) {
            Ok(eq) => {
                if market.import_equipment(eq) {
                    added += 1;
                }
            }
            Err(e) => warn!("Skipping malformed remote listing: {}", e),
        }
    }

    info!("Imported {} listings from the remote catalog", added);
    added
}
