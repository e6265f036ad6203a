/// Fixed usage text for the `h` command. No side effects, no collaborator
/// calls.
pub(crate) fn usage() -> &'static str {
    "請輸入以下指令:\n\
     r <股票代號>: 註冊股票, 會收到每日收盤價推播\n\
     d <股票代號>: 刪除此股票的每日收盤價推播\n\
     q: 查詢註冊的股票\n\
     h: 指令說明\n\
     <股票代號>: 查詢此股票收盤價"
}
