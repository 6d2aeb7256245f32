use crate::domain::analytics::RestockItem;

pub const CSV_HEADER: [&str; 4] = ["name", "quantity", "min_stock", "to_order"];

/// Renders the restock list as UTF-8 CSV with a header row.
pub fn restock_csv(items: &[RestockItem]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for item in items {
        writer.write_record([
            item.name.clone(),
            item.quantity.to_string(),
            item.min_stock.to_string(),
            item.to_order.to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))
}
