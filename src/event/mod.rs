/// 預測前決定目標交易日
pub mod index_forecast;
/// 抓取當日 MASI 點數並寫入歷史檔
pub mod index_history;
