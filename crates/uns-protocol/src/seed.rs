//! FY-Fab reference namespace.
//!
//! A fastener plant with ERP, PLM, tooling, warehouse and scheduling domains
//! plus a sheet metal and a cold heading line. Used as the initial static
//! tree and as a fixture.

use serde_json::{json, Value};

use crate::builder::{TopicAttributes, TreeBuilder};
use crate::error::Result;
use crate::types::{Node, Template, TopicType};

fn folder(path: &'static str, description: &str) -> (&'static str, TopicAttributes) {
    (path, TopicAttributes::default().with_description(description))
}

fn topic(
    path: &'static str,
    topic_type: TopicType,
    est_mps: f64,
    description: &str,
    template: Value,
) -> (&'static str, TopicAttributes) {
    let template = match template {
        Value::Object(map) => map,
        _ => Template::new(),
    };
    (
        path,
        TopicAttributes::typed(topic_type)
            .with_est_mps(est_mps)
            .with_description(description)
            .with_template(template),
    )
}

/// Flat `(path, attributes)` records in display order.
pub fn seed_records() -> Vec<(&'static str, TopicAttributes)> {
    use TopicType::*;

    vec![
        folder("v1/FY-Fab", "Root node for FY-Fab factory namespace"),
        // ERP
        folder("v1/FY-Fab/erp", "ERP integration domain for orders"),
        folder("v1/FY-Fab/erp/site", "Site-level grouping for ERP-fed states"),
        topic(
            "v1/FY-Fab/erp/site/state/order_registry",
            State,
            0.03,
            "ERP publishes current open orders registry",
            json!({
                "op": "upsert",
                "order_id": "PO-202507-0001",
                "product_id": "P-M6",
                "qty": 5000,
                "due_date": "2025-07-20",
                "priority": 50,
                "min_batch": 500,
                "source": "ERP-A"
            }),
        ),
        // PLM
        folder("v1/FY-Fab/plm", "Product lifecycle management (product master data)"),
        folder("v1/FY-Fab/plm/site", "Site-level grouping for PLM master data"),
        topic(
            "v1/FY-Fab/plm/site/info/product_master",
            Info,
            0.005,
            "Master data of products including routing steps",
            json!({
                "op": "upsert",
                "product_id": "P-M6",
                "name": "Hex Bolt M6",
                "material_type": "wire",
                "route_v": 3,
                "route_step_1": "CUTWIRE",
                "route_step_2": "COLD",
                "route_step_3": "THREAD"
            }),
        ),
        // tooling
        folder("v1/FY-Fab/tool", "Mold and tooling info for setup & compatibility"),
        folder("v1/FY-Fab/tool/site", "Site-level grouping for tooling info"),
        topic(
            "v1/FY-Fab/tool/site/info/mold_registry",
            Info,
            0.002,
            "Registry of all molds, usage limits and compatible products",
            json!({
                "op": "upsert",
                "mold_id": "MOLD-THR-A",
                "for_function": "ch",
                "for_station": "THREAD1",
                "lifetime_cycles": 100000,
                "compatible_products": "P-M6;P-M5"
            }),
        ),
        topic(
            "v1/FY-Fab/tool/site/info/changeover_matrix",
            Info,
            0.001,
            "Matrix describing setup time when switching molds",
            json!({
                "function": "ch",
                "station": "THREAD1",
                "from_mold": "MOLD-THR-A",
                "to_mold": "MOLD-THR-B",
                "setup_time_min": 12
            }),
        ),
        // warehouse
        folder("v1/FY-Fab/wh", "Warehouse inventory snapshots and adjustments"),
        folder("v1/FY-Fab/wh/site", "Site-level grouping for warehouse state"),
        topic(
            "v1/FY-Fab/wh/site/state/inventory_materials",
            State,
            0.05,
            "Real-time material inventory levels in warehouse",
            json!({
                "material_id": "WIRE-6MM",
                "uom": "kg",
                "onhand": 1250.0,
                "allocated": 300.0,
                "last_update": "2025-09-05T06:00:00Z"
            }),
        ),
        // scheduling
        folder("v1/FY-Fab/sched", "Scheduling draft plans and dispatch actions"),
        folder("v1/FY-Fab/sched/site", "Site-level grouping for sched plans and queues"),
        topic(
            "v1/FY-Fab/sched/site/info/plan_draft",
            Info,
            0.2,
            "Draft production plan proposals before dispatch",
            json!({
                "plan_id": "PLAN-2025-09-05-01",
                "gen_ts": "2025-09-05T06:10:00Z",
                "order_id": "PO-202507-0001",
                "product_id": "P-M6",
                "step_code": "THREAD",
                "target_station": "THREAD1",
                "job_id": "JOB-000123"
            }),
        ),
        topic(
            "v1/FY-Fab/sched/site/action/push_to_queue",
            Action,
            0.05,
            "Action to send selected plan jobs into dispatch queues",
            json!({
                "plan_id": "PLAN-2025-09-05-01",
                "job_id": "JOB-000123",
                "target_function": "ch",
                "target_station": "THREAD1",
                "dispatch_mode": "append"
            }),
        ),
        topic(
            "v1/FY-Fab/sched/site/state/queue_snapshot",
            State,
            0.1,
            "Aggregated view of station queues: counts of queued and running jobs",
            json!({
                "snapshot_ts": "2025-09-05T07:59:30Z",
                "station_count": 6,
                "queued_jobs": 14,
                "running_jobs": 3
            }),
        ),
        // sheet metal line
        folder("v1/FY-Fab/sm", "Sheet metal production line topics (LASER, COAT)"),
        folder("v1/FY-Fab/sm/LASER1", "LASER1 station for laser cutting"),
        topic(
            "v1/FY-Fab/sm/LASER1/state/current_job",
            State,
            1.0,
            "State of current job running on LASER1",
            json!({"job_id": "JOB-000101", "status": "queued", "batch_qty": 300}),
        ),
        topic(
            "v1/FY-Fab/sm/LASER1/action/dispatch_task",
            Action,
            0.2,
            "Scheduler pushes a job item into LASER1 queue",
            json!({
                "job_id": "JOB-000101",
                "order_id": "PO-202507-0002",
                "product_id": "P-SHEET-01",
                "step_code": "LASER",
                "batch_qty": 300
            }),
        ),
        topic(
            "v1/FY-Fab/sm/LASER1/action/start_task",
            Action,
            0.2,
            "Operator/HMI triggers the start of current job on LASER1",
            json!({"job_id": "JOB-000101", "operator_id": "OP-012", "expect_minutes": 5}),
        ),
        topic(
            "v1/FY-Fab/sm/LASER1/action/complete_task",
            Action,
            0.2,
            "Operator/HMI completes current job on LASER1",
            json!({
                "job_id": "JOB-000101",
                "operator_id": "OP-012",
                "good_qty": 300,
                "end_reason": "normal"
            }),
        ),
        topic(
            "v1/FY-Fab/sm/LASER1/metrics/cycle_ms",
            Metrics,
            2.5,
            "Cycle time measurements from LASER1",
            json!({"cycle_ms": 4500}),
        ),
        folder("v1/FY-Fab/sm/COAT1", "COAT1 station for powder coating with cleaning rules"),
        topic(
            "v1/FY-Fab/sm/COAT1/info/clean_rule",
            Info,
            0.001,
            "Cleaning rule definition: minimum clean time and triggers",
            json!({"min_clean_time_min": 10, "trigger_on_color_change": "Y"}),
        ),
        topic(
            "v1/FY-Fab/sm/COAT1/state/clean_status",
            State,
            0.02,
            "Current cleaning status of COAT1: idle/running/done",
            json!({"status": "idle", "start_ts": ""}),
        ),
        topic(
            "v1/FY-Fab/sm/COAT1/action/clean_start",
            Action,
            0.01,
            "Action to start cleaning cycle on COAT1",
            json!({"by": "system", "reason": "color_change"}),
        ),
        // cold heading line
        folder("v1/FY-Fab/ch", "Cold heading line topics (CUTWIRE/COLD/THREAD/HT)"),
        folder("v1/FY-Fab/ch/COLD1", "Cold heading machine COLD1"),
        topic(
            "v1/FY-Fab/ch/COLD1/state/current_mold",
            State,
            0.02,
            "Current mold mounted on COLD1 and its life usage",
            json!({
                "mold_id": "MOLD-COLD-A",
                "since_ts": "2025-09-05T07:40:00Z",
                "life_used_cycles": 3200
            }),
        ),
        topic(
            "v1/FY-Fab/ch/COLD1/action/change_mold",
            Action,
            0.01,
            "Action to change mold on COLD1 with an estimated setup time",
            json!({"to_mold": "MOLD-COLD-A", "reason": "product_switch", "est_setup_min": 10}),
        ),
        topic(
            "v1/FY-Fab/ch/COLD1/action/dispatch_task",
            Action,
            0.2,
            "Scheduler pushes a job item into COLD1 queue",
            json!({
                "job_id": "JOB-000120",
                "order_id": "PO-202507-0001",
                "product_id": "P-M6",
                "step_code": "COLD",
                "batch_qty": 500,
                "need_mold": "MOLD-COLD-A"
            }),
        ),
        topic(
            "v1/FY-Fab/ch/COLD1/metrics/good_count",
            Metrics,
            2.0,
            "Good part counter reported by COLD1.",
            json!({"count": 120}),
        ),
        topic(
            "v1/FY-Fab/ch/COLD1/metrics/energy_kwh",
            Metrics,
            0.5,
            "Energy consumption kWh metering from COLD1",
            json!({"kwh": 3.2}),
        ),
        folder("v1/FY-Fab/ch/THREAD1", "Thread rolling machine THREAD1"),
        topic(
            "v1/FY-Fab/ch/THREAD1/state/current_mold",
            State,
            0.02,
            "Current mold mounted on THREAD1 and its life usage",
            json!({
                "mold_id": "MOLD-THR-A",
                "since_ts": "2025-09-05T07:50:00Z",
                "life_used_cycles": 820
            }),
        ),
        topic(
            "v1/FY-Fab/ch/THREAD1/action/dispatch_task",
            Action,
            0.2,
            "Scheduler pushes a job item into THREAD1 queue",
            json!({
                "job_id": "JOB-000123",
                "order_id": "PO-202507-0001",
                "product_id": "P-M6",
                "step_code": "THREAD",
                "batch_qty": 500,
                "need_mold": "MOLD-THR-A",
                "due_date": "2025-07-20",
                "priority": 50
            }),
        ),
        topic(
            "v1/FY-Fab/ch/THREAD1/state/current_job",
            State,
            1.0,
            "State of current job running on THREAD1",
            json!({
                "job_id": "JOB-000123",
                "status": "queued",
                "queued_ts": "2025-09-05T08:00:00Z",
                "start_ts": "",
                "end_ts": "",
                "batch_qty": 500
            }),
        ),
        topic(
            "v1/FY-Fab/ch/THREAD1/action/start_task",
            Action,
            0.2,
            "Operator/HMI starts the current job on THREAD1",
            json!({"job_id": "JOB-000123", "operator_id": "OP-007", "expect_minutes": 6}),
        ),
        topic(
            "v1/FY-Fab/ch/THREAD1/action/complete_task",
            Action,
            0.2,
            "Operator/HMI completes the current job on THREAD1",
            json!({
                "job_id": "JOB-000123",
                "operator_id": "OP-007",
                "good_qty": 500,
                "end_reason": "normal"
            }),
        ),
        folder("v1/FY-Fab/ch/HT1", "Heat treatment station HT1"),
        topic(
            "v1/FY-Fab/ch/HT1/state/batch_status",
            State,
            0.05,
            "Current batch status on HT1: idle/running/done",
            json!({"job_id": "JOB-000140", "status": "idle"}),
        ),
        topic(
            "v1/FY-Fab/ch/HT1/action/start_task",
            Action,
            0.1,
            "Operator/HMI starts the batch on HT1.",
            json!({"job_id": "JOB-000140", "operator_id": "OP-021", "expect_minutes": 30}),
        ),
        topic(
            "v1/FY-Fab/ch/HT1/action/complete_task",
            Action,
            0.1,
            "Operator/HMI completes the batch on HT1",
            json!({"job_id": "JOB-000140", "operator_id": "OP-021", "good_qty": 500}),
        ),
    ]
}

/// The reference namespace as a tree rooted at `v1`.
pub fn seed_tree() -> Result<Node> {
    TreeBuilder::from_records(seed_records())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{collect_leaves, flatten};
    use crate::path;
    use crate::selftest::SelfTestRunner;

    #[test]
    fn test_seed_builds_single_root() {
        let root = seed_tree().unwrap();
        assert_eq!(root.path, "v1");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].path, "v1/FY-Fab");
    }

    #[test]
    fn test_seed_passes_every_rule() {
        let root = seed_tree().unwrap();
        for result in SelfTestRunner::default().run(&root) {
            assert!(result.pass, "{} failed: {:?}", result.name, result.detail);
        }
    }

    #[test]
    fn test_seed_shape() {
        let root = seed_tree().unwrap();
        assert_eq!(collect_leaves(&root).len(), 29);
        assert!(flatten(&root).iter().all(|n| path::depth(&n.path) <= 7));
        let erp = root.find("v1/FY-Fab/erp").unwrap();
        assert_eq!(erp.description.as_deref(), Some("ERP integration domain for orders"));
    }
}
