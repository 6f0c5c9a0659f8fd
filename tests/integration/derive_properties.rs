#![allow(missing_docs)]

use bufreport::derive::{derive, efficiency_percent, EfficiencyBand, BAD_ABOVE, GOOD_BELOW};
use bufreport::measurement::workload_label;
use bufreport::{LogicalIoCheck, Measurement, Summary, Table};
use proptest::prelude::*;

fn arb_measurement() -> impl Strategy<Value = Measurement> {
    (0u32..=100, 1u64..=10_000, 0u64..=10_000, 0.0f64..=100.0).prop_flat_map(
        |(read_percent, total_logical_io, physical_seed, hit_rate)| {
            let total_physical_io = physical_seed % (total_logical_io + 1);
            (0..=total_physical_io).prop_map(move |physical_reads| Measurement {
                read_percent,
                write_percent: 100 - read_percent,
                logical_reads: total_logical_io / 2,
                physical_reads,
                logical_writes: total_logical_io - total_logical_io / 2,
                physical_writes: total_physical_io - physical_reads,
                hit_rate,
                total_logical_io,
                total_physical_io,
            })
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn efficiency_stays_within_percent_range(logical in 1u64..=1_000_000, share in 0.0f64..=1.0) {
        let physical = (logical as f64 * share).floor() as u64;
        let percent = efficiency_percent(physical, logical).expect("logical is positive");
        prop_assert!((0.0..=100.0).contains(&percent));
    }

    #[test]
    fn label_splits_back_into_percentages(read in 0u32..=100) {
        let label = workload_label(read, 100 - read);
        let (r, w) = label.split_once('/').expect("slash separator");
        prop_assert_eq!(r.parse::<u32>().unwrap(), read);
        prop_assert_eq!(w.parse::<u32>().unwrap(), 100 - read);
    }

    #[test]
    fn bands_partition_the_axis(percent in 0.0f64..=100.0) {
        let band = EfficiencyBand::classify(percent);
        let expected = if percent < GOOD_BELOW {
            EfficiencyBand::Good
        } else if percent <= BAD_ABOVE {
            EfficiencyBand::Warning
        } else {
            EfficiencyBand::Bad
        };
        prop_assert_eq!(band, expected);
    }

    #[test]
    fn derived_columns_follow_row_order(rows in prop::collection::vec(arb_measurement(), 1..12)) {
        let table: Table = rows.iter().cloned().collect();
        let derived = derive(&table).expect("positive logical io");
        prop_assert_eq!(derived.len(), rows.len());
        for (row, (label, efficiency)) in rows.iter().zip(derived.labels.iter().zip(&derived.efficiency)) {
            prop_assert_eq!(label, &row.label());
            prop_assert!((0.0..=100.0).contains(efficiency));
        }
    }

    #[test]
    fn summary_bounds_enclose_every_row(rows in prop::collection::vec(arb_measurement(), 1..12)) {
        let table: Table = rows.iter().cloned().collect();
        let summary = Summary::compute(&table, 1000, LogicalIoCheck::Warn).expect("non-empty table");

        prop_assert!(summary.worst.hit_rate <= summary.mean_hit_rate + 1e-9);
        prop_assert!(summary.mean_hit_rate <= summary.best.hit_rate + 1e-9);
        for row in &rows {
            prop_assert!(summary.physical_reads.min <= row.physical_reads);
            prop_assert!(row.physical_reads <= summary.physical_reads.max);
            prop_assert!(summary.physical_io.min <= row.total_physical_io);
            prop_assert!(row.total_physical_io <= summary.physical_io.max);
        }
        let best = rows
            .iter()
            .position(|row| row.hit_rate == summary.best.hit_rate)
            .expect("best comes from a row");
        prop_assert_eq!(&summary.best.label, &rows[best].label());
    }
}
