use crate::domain::point::{PointHistory, TransactionType, UserPoint};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct BalanceRow {
    user: i64,
    amount: i64,
    updated_at: i64,
}

impl From<&UserPoint> for BalanceRow {
    fn from(point: &UserPoint) -> Self {
        Self {
            user: point.user_id,
            amount: point.amount,
            updated_at: point.updated_at_millis,
        }
    }
}

#[derive(Serialize)]
struct HistoryRow {
    id: u64,
    user: i64,
    amount: i64,
    r#type: TransactionType,
    timestamp: i64,
}

impl From<&PointHistory> for HistoryRow {
    fn from(entry: &PointHistory) -> Self {
        Self {
            id: entry.id,
            user: entry.user_id,
            amount: entry.amount,
            r#type: entry.kind,
            timestamp: entry.timestamp_millis,
        }
    }
}

/// Writes balances and history entries as CSV.
///
/// Each `write_*` call emits its own header row, so one writer can output a
/// balance table followed by a history table.
pub struct PointWriter<W: Write> {
    sink: W,
}

impl<W: Write> PointWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn write_balances<'a>(
        &mut self,
        points: impl IntoIterator<Item = &'a UserPoint>,
    ) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut self.sink);
        writer.write_record(["user", "amount", "updated_at"])?;
        for point in points {
            writer.serialize(BalanceRow::from(point))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_history<'a>(
        &mut self,
        entries: impl IntoIterator<Item = &'a PointHistory>,
    ) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut self.sink);
        writer.write_record(["id", "user", "amount", "type", "timestamp"])?;
        for entry in entries {
            writer.serialize(HistoryRow::from(entry))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_balances() {
        let points = [UserPoint::new(1, 10, 100), UserPoint::new(2, 0, 200)];
        let mut writer = PointWriter::new(Vec::new());
        writer.write_balances(&points).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(output, "user,amount,updated_at\n1,10,100\n2,0,200\n");
    }

    #[test]
    fn test_write_history() {
        let entries = [
            PointHistory {
                id: 1,
                user_id: 1,
                amount: 10,
                kind: TransactionType::Charge,
                timestamp_millis: 5,
            },
            PointHistory {
                id: 2,
                user_id: 1,
                amount: 4,
                kind: TransactionType::Use,
                timestamp_millis: 6,
            },
        ];
        let mut writer = PointWriter::new(Vec::new());
        writer.write_history(&entries).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            output,
            "id,user,amount,type,timestamp\n1,1,10,CHARGE,5\n2,1,4,USE,6\n"
        );
    }
}
