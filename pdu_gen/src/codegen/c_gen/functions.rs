/* Function definitions for one class, rendered from its plan */

use super::helpers::{
  c_comment, constant_name, element_c_type, field_ident, fn_prefix, initializer_value, int_literal, mask_literal,
  max_macro, printf_format, sanitize, type_name, unsigned_c_type, wire_suffix,
};
use super::types::{ListShape, field_shape};
use crate::codegen::shared::initial::numeric_text;
use crate::codegen::shared::{
  BitfieldAccessor, ClassPlan, CompareStep, DumpStep, FieldPlan, MarshalStep, SizeTerm, StorageWrapper,
  UnmarshalStep,
};
use crate::config::GeneratorConfig;
use crate::schema::{ElementKind, FieldKind, LiteralFormat, PrimitiveType};
use indexmap::IndexMap;
use std::fmt::{self, Write};

pub struct CClassEmitter<'a> {
  pub config: &'a GeneratorConfig,
  pub wrappers: &'a IndexMap<String, StorageWrapper<'a>>,
}

impl<'a> CClassEmitter<'a> {
  pub fn emit_functions(&self, out: &mut String, plan: &ClassPlan) -> fmt::Result {
    if plan.is_alias() {
      return Ok(());
    }
    let name = fn_prefix(&plan.class_name);

    for constant in &plan.constants {
      let value = match constant.value.as_integer() {
        Some(v) if constant.prim.is_integer() => int_literal(v, constant.prim),
        integer => numeric_text(&constant.value, integer, &LiteralFormat::Numeric(constant.prim)),
      };
      writeln!(
        out,
        "{} const {}_{} = {};",
        constant.prim.c_type(),
        name,
        sanitize(&constant.name),
        value
      )?;
    }
    if !plan.constants.is_empty() {
      writeln!(out)?;
    }

    self.emit_init(out, plan)?;
    emit_free(out, plan)?;
    emit_marshal(out, plan)?;
    emit_unmarshal(out, plan)?;
    emit_size(out, plan)?;
    if self.config.emit_equality {
      emit_equals(out, plan)?;
      emit_hash(out, plan)?;
    }
    if self.config.emit_dump {
      emit_dump(out, plan)?;
    }
    if self.config.emit_bitfield_accessors {
      for accessor in &plan.bitfields {
        emit_bitfield_accessor(out, plan, accessor)?;
      }
    }
    for field in plan.fields.iter().filter(|f| f.text_capable) {
      emit_text_accessors(out, plan, field)?;
    }
    Ok(())
  }

  fn emit_init(&self, out: &mut String, plan: &ClassPlan) -> fmt::Result {
    let ty = type_name(&plan.class_name);
    writeln!(out, "void {}_init( {} * self ) {{", fn_prefix(&plan.class_name), ty)?;
    writeln!(out, "  memset( self, 0, sizeof( {} ) );", ty)?;
    if let Some(parent) = &plan.parent {
      writeln!(out, "  {}_init( &self->parent );", fn_prefix(parent))?;
    }
    for field in plan.stored_fields() {
      let f = field_ident(&field.name);
      match &field.kind {
        FieldKind::ClassRef { class } => writeln!(out, "  {}_init( &self->{} );", fn_prefix(class), f)?,
        FieldKind::FixedList { element: ElementKind::ClassRef { class }, .. } => {
          if let Some(ListShape::Array(count)) = field_shape(plan, &field.name) {
            if count > 0 {
              writeln!(out, "  for( size_t i = 0; i < {}; i++ ) {}_init( &self->{}[i] );", count, fn_prefix(class), f)?;
            }
          }
        }
        _ => {}
      }
    }
    if self.config.emit_initial_values {
      for init in &plan.initializers {
        writeln!(
          out,
          "  self->{}{} = {};",
          "parent.".repeat(init.depth),
          field_ident(&init.field),
          initializer_value(init, self.wrappers)
        )?;
      }
    }
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
  }
}

/* Enum name lookup; duplicate values resolve to the first declared name */
pub fn emit_wrapper_functions(out: &mut String, wrapper: &StorageWrapper<'_>) -> fmt::Result {
  if wrapper.values().is_empty() {
    return Ok(());
  }
  writeln!(out, "char const * {}_name( {} value ) {{", fn_prefix(&wrapper.name), type_name(&wrapper.name))?;
  for (variant, _) in wrapper.values() {
    writeln!(out, "  if( value == {} ) return \"{}\";", constant_name(&wrapper.name, variant), variant)?;
  }
  writeln!(out, "  return NULL;")?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_free(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  let ty = type_name(&plan.class_name);
  writeln!(out, "void {}_free( {} * self ) {{", fn_prefix(&plan.class_name), ty)?;
  let mut touched = false;
  if let Some(parent) = &plan.parent {
    writeln!(out, "  {}_free( &self->parent );", fn_prefix(parent))?;
    touched = true;
  }
  for field in plan.stored_fields() {
    let f = field_ident(&field.name);
    let class = match &field.kind {
      FieldKind::ClassRef { class } => {
        writeln!(out, "  {}_free( &self->{} );", fn_prefix(class), f)?;
        touched = true;
        continue;
      }
      FieldKind::FixedList { element, .. } | FieldKind::DynamicList { element, .. } => element.class_name(),
      _ => continue,
    };
    match field_shape(plan, &field.name) {
      Some(ListShape::Array(count)) => {
        if let Some(class) = class.filter(|_| count > 0) {
          writeln!(out, "  for( size_t i = 0; i < {}; i++ ) {}_free( &self->{}[i] );", count, fn_prefix(class), f)?;
          touched = true;
        }
      }
      Some(ListShape::Buffer) => {
        emit_release_buffer(out, f.as_str(), class)?;
        touched = true;
      }
      None => {}
    }
  }
  if !touched {
    writeln!(out, "  (void)self;")?;
  }
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_release_buffer(out: &mut String, f: &str, class: Option<&str>) -> fmt::Result {
  if let Some(class) = class {
    writeln!(out, "  for( size_t i = 0; i < self->{}_len; i++ ) {}_free( &self->{}[i] );", f, fn_prefix(class), f)?;
  }
  writeln!(out, "  free( self->{} );", f)?;
  writeln!(out, "  self->{} = NULL;", f)?;
  writeln!(out, "  self->{}_len = 0;", f)?;
  Ok(())
}

fn put_element(element: &ElementKind, expr: &str) -> String {
  match element {
    ElementKind::ClassRef { class } => format!("{}_marshal( &{}, w )", fn_prefix(class), expr),
    other => match other.storage_primitive() {
      Some(prim) => format!("pdu_put_{}( w, {} )", wire_suffix(prim), expr),
      None => String::new(),
    },
  }
}

fn get_element(element: &ElementKind, expr: &str) -> String {
  match element {
    ElementKind::ClassRef { class } => format!("{}_unmarshal( &{}, r )", fn_prefix(class), expr),
    other => match other.storage_primitive() {
      Some(prim) => format!("pdu_get_{}( r, &{} )", wire_suffix(prim), expr),
      None => String::new(),
    },
  }
}

/* Loop bound for a list field */
fn list_len(plan: &ClassPlan, field: &str) -> Option<String> {
  match field_shape(plan, field)? {
    ListShape::Array(0) => None,
    ListShape::Array(count) => Some(count.to_string()),
    ListShape::Buffer => Some(format!("self->{}_len", field_ident(field))),
  }
}

fn emit_marshal(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  let ty = type_name(&plan.class_name);
  writeln!(out, "int {}_marshal( {} const * self, pdu_writer_t * w ) {{", fn_prefix(&plan.class_name), ty)?;
  if plan.marshal.is_empty() {
    writeln!(out, "  (void)self;")?;
    writeln!(out, "  (void)w;")?;
  }
  for step in &plan.marshal {
    match step {
      MarshalStep::Parent { class } => {
        writeln!(out, "  if( {}_marshal( &self->parent, w ) ) return -1;", fn_prefix(class))?
      }
      MarshalStep::Value { field, element } => {
        let expr = format!("self->{}", field_ident(field));
        writeln!(out, "  if( {} ) return -1;", put_element(element, &expr))?;
      }
      MarshalStep::LiveCount { prim, list, .. } => {
        let len = match field_shape(plan, list) {
          Some(ListShape::Array(count)) => count.to_string(),
          _ => format!("self->{}_len", field_ident(list)),
        };
        if let Some(max) = max_macro(*prim) {
          writeln!(out, "  if( (uint64_t){} > (uint64_t){} ) return -1;", len, max)?;
        }
        writeln!(out, "  if( pdu_put_{}( w, ({}){} ) ) return -1;", wire_suffix(*prim), prim.c_type(), len)?;
      }
      MarshalStep::FixedElements { field, element, .. } | MarshalStep::LiveElements { field, element } => {
        if let Some(len) = list_len(plan, field) {
          let expr = format!("self->{}[i]", field_ident(field));
          writeln!(out, "  for( size_t i = 0; i < {}; i++ ) {{", len)?;
          writeln!(out, "    if( {} ) return -1;", put_element(element, &expr))?;
          writeln!(out, "  }}")?;
        }
      }
      MarshalStep::Pad { bytes } => writeln!(out, "  if( pdu_put_zeros( w, {} ) ) return -1;", bytes)?,
    }
  }
  writeln!(out, "  return 0;")?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_unmarshal(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  let ty = type_name(&plan.class_name);
  writeln!(out, "int {}_unmarshal( {} * self, pdu_reader_t * r ) {{", fn_prefix(&plan.class_name), ty)?;
  if plan.unmarshal.is_empty() {
    writeln!(out, "  (void)self;")?;
    writeln!(out, "  (void)r;")?;
  }
  for step in &plan.unmarshal {
    match step {
      UnmarshalStep::Parent { class } => {
        writeln!(out, "  if( {}_unmarshal( &self->parent, r ) ) return -1;", fn_prefix(class))?
      }
      UnmarshalStep::Value { field, element } => {
        let expr = format!("self->{}", field_ident(field));
        writeln!(out, "  if( {} ) return -1;", get_element(element, &expr))?;
      }
      UnmarshalStep::FixedElements { field, element, .. } => {
        if let Some(len) = list_len(plan, field) {
          let expr = format!("self->{}[i]", field_ident(field));
          writeln!(out, "  for( size_t i = 0; i < {}; i++ ) {{", len)?;
          writeln!(out, "    if( {} ) return -1;", get_element(element, &expr))?;
          writeln!(out, "  }}")?;
        }
      }
      UnmarshalStep::CountedElements { field, element, counter } => {
        emit_counted_read(out, plan, field, element, counter.as_deref())?;
      }
      UnmarshalStep::SkipPad { bytes } => writeln!(out, "  if( pdu_skip( r, {} ) ) return -1;", bytes)?,
    }
  }
  writeln!(out, "  return 0;")?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}

fn counter_prim(plan: &ClassPlan, counter: &str) -> Option<PrimitiveType> {
  plan.field(counter).and_then(|f| f.kind.as_element()).and_then(|e| e.storage_primitive())
}

fn emit_counted_read(
  out: &mut String,
  plan: &ClassPlan,
  field: &str,
  element: &ElementKind,
  counter: Option<&str>,
) -> fmt::Result {
  let f = field_ident(field);
  emit_release_buffer(out, &f, element.class_name())?;
  let Some(counter) = counter else {
    return Ok(());
  };
  let c = field_ident(counter);
  let elem_ty = element_c_type(element);

  writeln!(out, "  {{")?;
  if counter_prim(plan, counter).is_some_and(|p| p.is_signed()) {
    writeln!(out, "    size_t n = self->{} > 0 ? (size_t)self->{} : 0;", c, c)?;
  } else {
    writeln!(out, "    size_t n = (size_t)self->{};", c)?;
  }
  writeln!(out, "    if( n ) {{")?;
  match element.fixed_width() {
    Some(width) => writeln!(out, "      if( n > pdu_reader_remaining( r ) / {} ) return -1;", width)?,
    /* the schema model guarantees every listed class takes at least one byte */
    None => writeln!(out, "      if( n > pdu_reader_remaining( r ) ) return -1;")?,
  }
  writeln!(out, "      self->{} = ({} *)calloc( n, sizeof( {} ) );", f, elem_ty, elem_ty)?;
  writeln!(out, "      if( !self->{} ) return -1;", f)?;
  writeln!(out, "      self->{}_len = n;", f)?;
  writeln!(out, "      for( size_t i = 0; i < n; i++ ) {{")?;
  if let ElementKind::ClassRef { class } = element {
    writeln!(out, "        {}_init( &self->{}[i] );", fn_prefix(class), f)?;
  }
  let expr = format!("self->{}[i]", f);
  writeln!(out, "        if( {} ) return -1;", get_element(element, &expr))?;
  writeln!(out, "      }}")?;
  writeln!(out, "    }}")?;
  writeln!(out, "  }}")?;
  Ok(())
}

fn emit_size(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  let ty = type_name(&plan.class_name);
  writeln!(out, "size_t {}_marshalled_size( {} const * self ) {{", fn_prefix(&plan.class_name), ty)?;
  writeln!(out, "  size_t size = 0;")?;
  if plan.size.is_empty() {
    writeln!(out, "  (void)self;")?;
  }
  for term in &plan.size {
    match term {
      SizeTerm::Parent { class } => {
        writeln!(out, "  size += {}_marshalled_size( &self->parent );", fn_prefix(class))?
      }
      SizeTerm::Fixed { field, bytes } => writeln!(out, "  size += {}; /* {} */", bytes, field)?,
      SizeTerm::Nested { field, class } => writeln!(
        out,
        "  size += {}_marshalled_size( &self->{} );",
        fn_prefix(class),
        field_ident(field)
      )?,
      SizeTerm::NestedElements { field, class } => {
        if let Some(len) = list_len(plan, field) {
          writeln!(
            out,
            "  for( size_t i = 0; i < {}; i++ ) size += {}_marshalled_size( &self->{}[i] );",
            len,
            fn_prefix(class),
            field_ident(field)
          )?;
        }
      }
      SizeTerm::LiveElements { field, element_width } => {
        if let Some(len) = list_len(plan, field) {
          writeln!(out, "  size += {} * {};", len, element_width)?;
        }
      }
    }
  }
  writeln!(out, "  return size;")?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}

fn equal_term(element: &ElementKind, a: &str, b: &str) -> String {
  match element {
    ElementKind::ClassRef { class } => format!("!{}_equals( &{}, &{} )", fn_prefix(class), a, b),
    ElementKind::Primitive { prim: PrimitiveType::Float32 } => format!("pdu_f32_bits( {} ) != pdu_f32_bits( {} )", a, b),
    ElementKind::Primitive { prim: PrimitiveType::Float64 } => format!("pdu_f64_bits( {} ) != pdu_f64_bits( {} )", a, b),
    _ => format!("{} != {}", a, b),
  }
}

fn emit_equals(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  let ty = type_name(&plan.class_name);
  writeln!(
    out,
    "int {}_equals( {} const * a, {} const * b ) {{",
    fn_prefix(&plan.class_name),
    ty,
    ty
  )?;
  if plan.comparison.is_empty() {
    writeln!(out, "  (void)a;")?;
    writeln!(out, "  (void)b;")?;
  }
  for step in &plan.comparison {
    match step {
      CompareStep::Parent { class } => {
        writeln!(out, "  if( !{}_equals( &a->parent, &b->parent ) ) return 0;", fn_prefix(class))?
      }
      CompareStep::Value { field, element } => {
        let f = field_ident(field);
        let (lhs, rhs) = (format!("a->{}", f), format!("b->{}", f));
        writeln!(out, "  if( {} ) return 0;", equal_term(element, &lhs, &rhs))?;
      }
      CompareStep::Elements { field, element } => {
        let f = field_ident(field);
        let len = match field_shape(plan, field) {
          Some(ListShape::Array(0)) | None => continue,
          Some(ListShape::Array(count)) => count.to_string(),
          Some(ListShape::Buffer) => {
            writeln!(out, "  if( a->{}_len != b->{}_len ) return 0;", f, f)?;
            format!("a->{}_len", f)
          }
        };
        let (lhs, rhs) = (format!("a->{}[i]", f), format!("b->{}[i]", f));
        writeln!(out, "  for( size_t i = 0; i < {}; i++ ) {{", len)?;
        writeln!(out, "    if( {} ) return 0;", equal_term(element, &lhs, &rhs))?;
        writeln!(out, "  }}")?;
      }
    }
  }
  writeln!(out, "  return 1;")?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}

fn hash_term(element: &ElementKind, expr: &str) -> String {
  match element {
    ElementKind::ClassRef { class } => format!("{}_hash( &{} )", fn_prefix(class), expr),
    ElementKind::Primitive { prim: PrimitiveType::Float32 } => format!("pdu_f32_bits( {} )", expr),
    ElementKind::Primitive { prim: PrimitiveType::Float64 } => format!("pdu_f64_bits( {} )", expr),
    _ => format!("(uint64_t){}", expr),
  }
}

fn emit_hash(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  let ty = type_name(&plan.class_name);
  writeln!(out, "uint64_t {}_hash( {} const * self ) {{", fn_prefix(&plan.class_name), ty)?;
  writeln!(out, "  uint64_t acc = 17;")?;
  if plan.comparison.is_empty() {
    writeln!(out, "  (void)self;")?;
  }
  for step in &plan.comparison {
    match step {
      CompareStep::Parent { class } => writeln!(
        out,
        "  acc = pdu_hash_combine( acc, {}_hash( &self->parent ) );",
        fn_prefix(class)
      )?,
      CompareStep::Value { field, element } => {
        let expr = format!("self->{}", field_ident(field));
        writeln!(out, "  acc = pdu_hash_combine( acc, {} );", hash_term(element, &expr))?;
      }
      CompareStep::Elements { field, element } => {
        if let Some(len) = list_len(plan, field) {
          let expr = format!("self->{}[i]", field_ident(field));
          writeln!(out, "  for( size_t i = 0; i < {}; i++ ) {{", len)?;
          writeln!(out, "    acc = pdu_hash_combine( acc, {} );", hash_term(element, &expr))?;
          writeln!(out, "  }}")?;
        }
      }
    }
  }
  writeln!(out, "  return acc;")?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_dump(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  let ty = type_name(&plan.class_name);
  writeln!(
    out,
    "void {}_dump( {} const * self, FILE * out, int indent ) {{",
    fn_prefix(&plan.class_name),
    ty
  )?;
  if plan.dump.is_empty() {
    writeln!(out, "  (void)self;")?;
    writeln!(out, "  (void)out;")?;
    writeln!(out, "  (void)indent;")?;
  }
  for step in &plan.dump {
    match step {
      DumpStep::Parent { class } => writeln!(out, "  {}_dump( &self->parent, out, indent );", fn_prefix(class))?,
      DumpStep::Value { field, element } => {
        let f = field_ident(field);
        match element {
          ElementKind::ClassRef { class } => {
            writeln!(out, "  fprintf( out, \"%*s{} :\\n\", indent, \"\" );", field)?;
            writeln!(out, "  {}_dump( &self->{}, out, indent + 2 );", fn_prefix(class), f)?;
          }
          other => {
            let (conv, cast) = printf_format(other.storage_primitive().unwrap_or(PrimitiveType::Uint64));
            writeln!(
              out,
              "  fprintf( out, \"%*s{} : {}\\n\", indent, \"\", {}self->{} );",
              field, conv, cast, f
            )?;
          }
        }
      }
      DumpStep::Elements { field, element } => {
        let f = field_ident(field);
        let len = list_len(plan, field);
        match element {
          ElementKind::ClassRef { class } => {
            if let Some(len) = len {
              writeln!(out, "  for( size_t i = 0; i < {}; i++ ) {{", len)?;
              writeln!(out, "    fprintf( out, \"%*s{}[%zu] :\\n\", indent, \"\", i );", field)?;
              writeln!(out, "    {}_dump( &self->{}[i], out, indent + 2 );", fn_prefix(class), f)?;
              writeln!(out, "  }}")?;
            }
          }
          other => {
            let (conv, cast) = printf_format(other.storage_primitive().unwrap_or(PrimitiveType::Uint64));
            writeln!(out, "  fprintf( out, \"%*s{} : [\", indent, \"\" );", field)?;
            if let Some(len) = len {
              writeln!(out, "  for( size_t i = 0; i < {}; i++ ) {{", len)?;
              writeln!(out, "    fprintf( out, \"%s{}\", i ? \", \" : \"\", {}self->{}[i] );", conv, cast, f)?;
              writeln!(out, "  }}")?;
            }
            writeln!(out, "  fprintf( out, \"]\\n\" );")?;
          }
        }
      }
      DumpStep::Text { field } => {
        let f = field_ident(field);
        writeln!(out, "  fprintf( out, \"%*s{} : \\\"\", indent, \"\" );", field)?;
        if let Some(len) = list_len(plan, field) {
          writeln!(out, "  for( size_t i = 0; i < {} && self->{}[i]; i++ ) {{", len, f)?;
          writeln!(out, "    fputc( (unsigned char)self->{}[i], out );", f)?;
          writeln!(out, "  }}")?;
        }
        writeln!(out, "  fprintf( out, \"\\\"\\n\" );")?;
      }
    }
  }
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_bitfield_accessor(out: &mut String, plan: &ClassPlan, accessor: &BitfieldAccessor) -> fmt::Result {
  let name = fn_prefix(&plan.class_name);
  let ty = type_name(&plan.class_name);
  let host = field_ident(&accessor.host);
  let value_ty = accessor.host_prim.c_type();
  let unsigned = unsigned_c_type(accessor.host_prim);
  let mask = mask_literal(accessor.mask);
  let shift = accessor.shift;
  let field = field_ident(&accessor.name);

  out.push_str(&c_comment(accessor.comment.as_deref(), ""));
  writeln!(out, "{} {}_get_{}( {} const * self ) {{", value_ty, name, field, ty)?;
  writeln!(
    out,
    "  return ({})( ( (uint64_t)({})self->{} & {} ) >> {} );",
    value_ty, unsigned, host, mask, shift
  )?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  writeln!(out, "void {}_set_{}( {} * self, {} value ) {{", name, field, ty, value_ty)?;
  writeln!(
    out,
    "  self->{} = ({})({})( ( (uint64_t)({})self->{} & ~{} ) | ( ( (uint64_t)({})value << {} ) & {} ) );",
    host, value_ty, unsigned, unsigned, host, mask, unsigned, shift, mask
  )?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_text_accessors(out: &mut String, plan: &ClassPlan, field: &FieldPlan) -> fmt::Result {
  let name = fn_prefix(&plan.class_name);
  let ty = type_name(&plan.class_name);
  let f = field_ident(&field.name);
  let shape = field_shape(plan, &field.name);
  let len = list_len(plan, &field.name).unwrap_or_else(|| "0".to_string());

  writeln!(out, "/* `{}` read as text, up to the first NUL */", field.name)?;
  writeln!(out, "size_t {}_get_{}_text( {} const * self, char * buf, size_t cap ) {{", name, f, ty)?;
  writeln!(out, "  size_t len = 0;")?;
  if len != "0" {
    writeln!(out, "  while( len < {} && self->{}[len] ) len++;", len, f)?;
  }
  writeln!(out, "  if( cap ) {{")?;
  writeln!(out, "    size_t n = len < cap - 1 ? len : cap - 1;")?;
  if len != "0" {
    writeln!(out, "    memcpy( buf, self->{}, n );", f)?;
  }
  writeln!(out, "    buf[n] = '\\0';")?;
  writeln!(out, "  }}")?;
  if len == "0" {
    writeln!(out, "  (void)self;")?;
  }
  writeln!(out, "  return len;")?;
  writeln!(out, "}}")?;
  writeln!(out)?;

  writeln!(out, "int {}_set_{}_text( {} * self, char const * text ) {{", name, f, ty)?;
  match shape {
    Some(ListShape::Array(0)) | None => {
      writeln!(out, "  (void)self;")?;
      writeln!(out, "  (void)text;")?;
    }
    Some(ListShape::Array(count)) => {
      writeln!(out, "  size_t len = strlen( text );")?;
      writeln!(out, "  if( len > {} ) len = {};", count - 1, count - 1)?;
      writeln!(out, "  memset( self->{}, 0, sizeof( self->{} ) );", f, f)?;
      writeln!(out, "  memcpy( self->{}, text, len );", f)?;
    }
    Some(ListShape::Buffer) => {
      let elem_ty = match &field.kind {
        FieldKind::FixedList { element, .. } | FieldKind::DynamicList { element, .. } => element_c_type(element),
        _ => "uint8_t".to_string(),
      };
      writeln!(out, "  size_t len = strlen( text );")?;
      writeln!(out, "  {} * copy = ({} *)malloc( len + 1 );", elem_ty, elem_ty)?;
      writeln!(out, "  if( !copy ) return -1;")?;
      writeln!(out, "  memcpy( copy, text, len + 1 );")?;
      writeln!(out, "  free( self->{} );", f)?;
      writeln!(out, "  self->{} = copy;", f)?;
      writeln!(out, "  self->{}_len = len + 1;", f)?;
    }
  }
  writeln!(out, "  return 0;")?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}
