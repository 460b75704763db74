use marketplace_api::entity::enums::{OrderStatus, RecordStatus, Role};

#[test]
fn cancel_is_only_reachable_from_pending() {
    assert!(OrderStatus::Pendente.can_transition_to(OrderStatus::Cancelado));
    for status in OrderStatus::ALL {
        if status != OrderStatus::Pendente {
            assert!(
                !status.can_transition_to(OrderStatus::Cancelado),
                "{} -> cancelado",
                status.as_str()
            );
        }
    }
}

#[test]
fn cancelled_orders_are_terminal() {
    for next in OrderStatus::ALL {
        assert!(!OrderStatus::Cancelado.can_transition_to(next));
    }
}

#[test]
fn forward_transitions_are_not_ordered() {
    assert!(OrderStatus::Pendente.can_transition_to(OrderStatus::Entregue));
    assert!(OrderStatus::Enviado.can_transition_to(OrderStatus::Confirmado));
}

#[test]
fn labels_parse_case_insensitively() {
    assert_eq!(OrderStatus::from_label(" EM_TRANSITO "), Some(OrderStatus::EmTransito));
    assert_eq!(OrderStatus::from_label("voando"), None);
    assert_eq!(RecordStatus::from_label("ativo"), Some(RecordStatus::Ativo));
    assert_eq!(Role::from_label("Executivo"), Some(Role::Executivo));
}
