use pageperfect_server::layout::grid::margin_for;
use pageperfect_server::layout::typography::line_height;
use pageperfect_server::layout::{
    derive_geometry, derive_typographic_scale, latex_preamble, GridFamily, Length, MarginPreset,
    PageSize,
};

#[test]
fn test_every_combination_yields_a_directive() {
    for size in PageSize::ALL {
        for preset in MarginPreset::ALL {
            for family in GridFamily::ALL {
                let directive = derive_geometry(size, preset, family).directive();
                assert!(
                    directive.starts_with(size.paper_directive()),
                    "{} does not start with the paper directive",
                    directive
                );
                assert!(directive.contains(",margin="));
                assert_eq!(directive, derive_geometry(size, preset, family).directive());
            }
        }
    }
}

#[test]
fn test_margins_grow_with_preset() {
    for size in PageSize::ALL {
        for family in GridFamily::ALL {
            let margins: Vec<f64> = MarginPreset::ALL
                .iter()
                .map(|preset| margin_for(size, *preset, family).to_inches())
                .collect();
            assert!(
                margins.windows(2).all(|pair| pair[0] < pair[1]),
                "margins not increasing for {:?}/{:?}: {:?}",
                size,
                family,
                margins
            );
        }
    }
}

#[test]
fn test_metric_sizes_use_millimetres() {
    for size in PageSize::ALL {
        let margin = margin_for(size, MarginPreset::Normal, GridFamily::Academic);
        match margin {
            Length::Millimetres(_) => assert!(size.is_metric()),
            Length::Inches(_) => assert!(!size.is_metric()),
        }
    }
}

#[test]
fn test_kdp_sizes_share_trim_directives() {
    assert_eq!(
        PageSize::SixByNine.paper_directive(),
        PageSize::AmazonSixByNine.paper_directive()
    );
    assert_eq!(
        derive_geometry(PageSize::AmazonEightFiveByEleven, MarginPreset::Generous, GridFamily::Trade).directive(),
        "paperwidth=8.5in,paperheight=11in,margin=1.222in"
    );
}

#[test]
fn test_typographic_scale_is_ordered() {
    for family in GridFamily::ALL {
        let scale = derive_typographic_scale(family);
        assert!(scale.h1 > scale.h2);
        assert!(scale.h2 > scale.h3);
        assert!(scale.h3 > scale.body);
        assert!(scale.body > scale.small);
        assert_eq!(scale.body, family.baseline_pt());
        assert_eq!(scale.line_height, line_height(family));

        let spacing = scale.spacing;
        let steps = [spacing.xs, spacing.sm, spacing.md, spacing.lg, spacing.xl, spacing.xxl];
        assert!(steps.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(spacing.md, scale.base_size);
    }
}

#[test]
fn test_preamble_defines_every_command() {
    let preamble = latex_preamble(&derive_typographic_scale(GridFamily::Editorial));
    for command in [
        "gridHOne",
        "gridHTwo",
        "gridHThree",
        "gridBody",
        "gridSmall",
        "gridSpaceXs",
        "gridSpaceSm",
        "gridSpaceMd",
        "gridSpaceLg",
        "gridSpaceXl",
        "gridSpaceXxl",
    ] {
        assert!(
            preamble.contains(&format!("\\providecommand{{\\{}}}", command)),
            "missing {}",
            command
        );
    }
    assert!(preamble.contains("\\setstretch{1.4}"));
}
