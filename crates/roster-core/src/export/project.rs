use std::fmt::Display;

use chrono::{Local, TimeZone};

use crate::domain::{Member, Role};

use super::table::{ExportTable, FIXED_COLUMNS};

const JOIN_DATE_FORMAT: &str = "%Y/%m/%d";

/// Project a roster snapshot into an export table, dating joins in the local zone.
pub fn project(members: &[Member], roles: &[Role]) -> ExportTable {
    project_in(members, roles, &Local)
}

/// Same as [`project`] with an explicit calendar zone for the join-date column.
///
/// Role columns: every role except the base role, stable-sorted by ascending
/// position. Rows: one per member, in input order.
pub fn project_in<Tz>(members: &[Member], roles: &[Role], tz: &Tz) -> ExportTable
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut columns: Vec<&Role> = roles.iter().filter(|r| !r.is_everyone).collect();
    // `sort_by_key` is stable: equal positions keep snapshot order.
    columns.sort_by_key(|r| r.position);

    let header = FIXED_COLUMNS
        .iter()
        .map(|s| s.to_string())
        .chain(columns.iter().map(|r| r.name.clone()))
        .collect::<Vec<_>>();

    let mut table = ExportTable::new(header, Vec::with_capacity(members.len()));
    for member in members {
        let joined = member
            .joined_at
            .map(|at| at.with_timezone(tz).format(JOIN_DATE_FORMAT).to_string())
            .unwrap_or_default();

        let mut row = Vec::with_capacity(FIXED_COLUMNS.len() + columns.len());
        row.push(joined);
        row.push(member.display_name.clone());
        row.push(member.username.clone());
        row.push(member.id.to_string());
        row.push(member.nickname.clone().unwrap_or_default());
        row.extend(columns.iter().map(|role| {
            if member.role_ids.contains(&role.id) {
                role.name.clone()
            } else {
                String::new()
            }
        }));
        table.push_row(row);
    }

    table
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{FixedOffset, Utc};

    use super::*;
    use crate::domain::Snowflake;

    fn role(id: u64, name: &str, position: i64) -> Role {
        Role {
            id: Snowflake(id),
            name: name.to_string(),
            position,
            is_everyone: false,
        }
    }

    fn everyone(id: u64, position: i64) -> Role {
        Role {
            id: Snowflake(id),
            name: "@everyone".to_string(),
            position,
            is_everyone: true,
        }
    }

    fn member(id: u64, username: &str, roles: &[u64]) -> Member {
        Member {
            id: Snowflake(id),
            username: username.to_string(),
            display_name: username.to_uppercase(),
            nickname: None,
            joined_at: None,
            role_ids: roles.iter().copied().map(Snowflake).collect::<HashSet<_>>(),
        }
    }

    fn role_header(table: &ExportTable) -> Vec<&str> {
        table.header()[FIXED_COLUMNS.len()..]
            .iter()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn roles_sorted_by_position() {
        let roles = vec![role(1, "C", 5), role(2, "A", 1), role(3, "B", 3)];
        let table = project(&[], &roles);
        assert_eq!(role_header(&table), vec!["A", "B", "C"]);
    }

    #[test]
    fn equal_positions_keep_input_order() {
        let roles = vec![
            role(1, "second-ish", 2),
            role(2, "tie-a", 1),
            role(3, "tie-b", 1),
            role(4, "tie-c", 1),
        ];
        let table = project(&[], &roles);
        assert_eq!(
            role_header(&table),
            vec!["tie-a", "tie-b", "tie-c", "second-ish"]
        );
    }

    #[test]
    fn base_role_never_a_column() {
        for pos in [-10, 0, 2, 99] {
            let roles = vec![role(1, "Mod", 1), everyone(9, pos), role(2, "Admin", 3)];
            let table = project(&[member(5, "a", &[9, 1])], &roles);
            assert_eq!(role_header(&table), vec!["Mod", "Admin"]);
            assert!(!table.header().iter().any(|h| h == "@everyone"));
        }
    }

    #[test]
    fn duplicate_role_names_are_both_emitted() {
        let roles = vec![role(1, "Team", 1), role(2, "Team", 2)];
        let table = project(&[member(5, "a", &[2])], &roles);
        assert_eq!(role_header(&table), vec!["Team", "Team"]);
        assert_eq!(table.rows()[0][5..], ["".to_string(), "Team".to_string()]);
    }

    #[test]
    fn empty_inputs() {
        let table = project(&[], &[]);
        assert_eq!(table.header(), FIXED_COLUMNS.map(String::from).as_slice());
        assert!(table.rows().is_empty());
        assert_eq!(table.role_columns(), 0);

        let only_everyone = project(&[member(1, "a", &[])], &[everyone(7, 0)]);
        assert_eq!(only_everyone.header().len(), 5);
        assert_eq!(only_everyone.rows()[0].len(), 5);
    }

    #[test]
    fn row_per_member_in_input_order_with_full_width() {
        let roles = vec![role(1, "A", 1), role(2, "B", 2), everyone(3, 0)];
        let members = vec![
            member(30, "zed", &[2]),
            member(10, "amy", &[1, 2, 3]),
            member(20, "bob", &[]),
        ];
        let table = project(&members, &roles);

        assert_eq!(table.rows().len(), members.len());
        for row in table.rows() {
            assert_eq!(row.len(), table.header().len());
        }
        let usernames: Vec<&str> = table.rows().iter().map(|r| r[2].as_str()).collect();
        assert_eq!(usernames, vec!["zed", "amy", "bob"]);
        assert_eq!(table.rows()[0][5..], ["".to_string(), "B".to_string()]);
        assert_eq!(table.rows()[1][5..], ["A".to_string(), "B".to_string()]);
        assert_eq!(table.rows()[2][5..], ["".to_string(), "".to_string()]);
    }

    #[test]
    fn join_date_uses_given_zone_calendar() {
        // 2024-03-04T20:30Z is already March 5th at UTC+9.
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let mut m = member(1, "a", &[]);
        m.joined_at = Some(Utc.with_ymd_and_hms(2024, 3, 4, 20, 30, 0).unwrap());

        let table = project_in(&[m.clone()], &[], &tokyo);
        assert_eq!(table.rows()[0][0], "2024/03/05");

        let table = project_in(&[m], &[], &Utc);
        assert_eq!(table.rows()[0][0], "2024/03/04");
    }

    #[test]
    fn join_date_local_calendar() {
        let mut m = member(1, "a", &[]);
        let noon = Local.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        m.joined_at = Some(noon.with_timezone(&Utc));

        let table = project(&[m], &[]);
        assert_eq!(table.rows()[0][0], "2024/03/05");
    }

    #[test]
    fn absent_join_date_and_nickname_are_empty() {
        let table = project(&[member(1, "a", &[])], &[]);
        assert_eq!(table.rows()[0][0], "");
        assert_eq!(table.rows()[0][4], "");
    }

    #[test]
    fn fixed_fields_copied_verbatim() {
        let mut m = member(175928847299117063, "alice", &[]);
        m.display_name = "Alice \"A\"".to_string();
        m.nickname = Some("アリス".to_string());
        let table = project(&[m], &[]);
        assert_eq!(
            table.rows()[0],
            vec!["", "Alice \"A\"", "alice", "175928847299117063", "アリス"]
        );
    }

    #[test]
    fn end_to_end_example() {
        let members = vec![Member {
            id: Snowflake(1),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            nickname: None,
            joined_at: None,
            role_ids: [Snowflake(2)].into_iter().collect(),
        }];
        let roles = vec![
            Role {
                id: Snowflake(1_000),
                name: "Everyone".to_string(),
                position: 0,
                is_everyone: true,
            },
            Role {
                id: Snowflake(2),
                name: "Mod".to_string(),
                position: 1,
                is_everyone: false,
            },
        ];

        let table = project(&members, &roles);
        assert_eq!(
            table.header(),
            ["Discord加入日", "表示名", "ユーザー名", "ユーザーID", "ニックネーム", "Mod"]
        );
        assert_eq!(table.rows(), [vec!["", "Alice", "alice", "1", "", "Mod"]]);
    }

    #[test]
    fn does_not_mutate_inputs_and_is_deterministic() {
        let roles = vec![role(1, "C", 5), role(2, "A", 1)];
        let members = vec![member(1, "a", &[1, 2])];
        let roles_before = roles.clone();
        let members_before = members.clone();

        let first = project(&members, &roles);
        let second = project(&members, &roles);
        assert_eq!(first, second);
        assert_eq!(roles, roles_before);
        assert_eq!(members, members_before);
    }
}
