use exprtape::access::{AdjointVectorAccess, VectorAccess};
use exprtape::prelude::*;
use exprtape::statement::reverse_statement;
use exprtape::traversal::{count_active_leaves, count_constant_leaves};
use proptest::prelude::*;

fn leaf(value: f64, raw: u32, active: bool) -> ActiveReal<f64> {
    if active {
        ActiveReal::with_identifier(value, Identifier::new(raw))
    } else {
        ActiveReal::passive(value)
    }
}

proptest! {
    #[test]
    fn active_leaf_count_survives_rewrites(
        values in prop::array::uniform3(-10.0f64..10.0),
        active in prop::array::uniform3(any::<bool>()),
    ) {
        let [a, b, c] = [0usize, 1, 2].map(|i| leaf(values[i], i as u32 + 1, active[i]));
        let expected = active.iter().filter(|&&x| x).count();

        prop_assert_eq!(count_active_leaves(&(a * b + c)), expected);
        prop_assert_eq!(count_active_leaves(&(c + b * a)), expected);
        prop_assert_eq!(count_active_leaves(&(sin(a) * (b - 2.0) / exp(c))), expected);
        prop_assert_eq!(count_constant_leaves(&(sin(a) * (b - 2.0) / exp(c))), 1);
    }

    #[test]
    fn staged_update_matches_manual_update(
        storage in prop::collection::vec(-5.0f64..5.0, 4),
        jacobians in prop::array::uniform3(-5.0f64..5.0),
        args in prop::array::uniform3(1u32..4),
        lhs in 1u32..4,
    ) {
        let mut expected = storage.clone();
        let staged = expected[lhs as usize];
        expected[lhs as usize] = 0.0;
        for (jac, &arg) in jacobians.iter().zip(&args) {
            expected[arg as usize] += jac * staged;
        }

        let mut actual = storage;
        {
            let mut access = AdjointVectorAccess::new(&mut actual);
            access.set_lhs_adjoint(Identifier::new(lhs));
            for (&jac, &arg) in jacobians.iter().zip(&args) {
                access.update_adjoint_with_lhs(Identifier::new(arg), jac);
            }
        }
        for (a, e) in actual.iter().zip(&expected) {
            prop_assert!((a - e).abs() <= 1e-12);
        }
    }

    #[test]
    fn vector_update_matches_component_updates(
        start in prop::array::uniform3(-5.0f64..5.0),
        delta in prop::array::uniform3(-5.0f64..5.0),
    ) {
        let id = Identifier::new(1);
        let mut by_component = vec![Direction::<f64, 3>::default(), Direction::new(start)];
        let mut by_vector = by_component.clone();

        let mut access = AdjointVectorAccess::new(&mut by_component);
        for (dim, &d) in delta.iter().enumerate() {
            access.update_adjoint(id, dim, d);
        }
        AdjointVectorAccess::new(&mut by_vector).update_adjoint_vec(id, &delta);

        prop_assert_eq!(by_component, by_vector);
    }

    #[test]
    fn statement_gradient_matches_finite_differences(
        a in 0.5f64..2.0,
        b in 0.5f64..2.0,
    ) {
        fn f(a: f64, b: f64) -> f64 {
            a * b + a.sin() / (1.0 + b * b)
        }

        let x = ActiveReal::with_identifier(a, Identifier::new(1));
        let y = ActiveReal::with_identifier(b, Identifier::new(2));
        let expr = x * y + sin(x) / (1.0 + y * y);
        prop_assert!((expr.value() - f(a, b)).abs() < 1e-12);

        let mut adjoints = vec![0.0, 0.0, 0.0, 1.0];
        reverse_statement(&expr, Identifier::new(3), &mut AdjointVectorAccess::new(&mut adjoints));

        let h = 1e-6;
        let da = (f(a + h, b) - f(a - h, b)) / (2.0 * h);
        let db = (f(a, b + h) - f(a, b - h)) / (2.0 * h);
        prop_assert!((adjoints[1] - da).abs() < 1e-6);
        prop_assert!((adjoints[2] - db).abs() < 1e-6);
    }
}
