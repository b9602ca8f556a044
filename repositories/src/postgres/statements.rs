use tokio_postgres::types::Type;

/// A query together with its parameter types, prepared lazily per connection
/// through the pool's statement cache.
pub struct Sql {
    pub query: &'static str,
    pub types: &'static [Type],
}

pub const GET_PROFILE: Sql = Sql {
    query: "select id, email, nombre, apellido, telefono, tipo_usuario_id, colonia_id, activo, created_at, updated_at
            from usuarios where id = $1",
    types: &[Type::UUID],
};

pub const CREATE_PROFILE: Sql = Sql {
    query: "insert into usuarios (id, email, nombre, apellido, telefono, tipo_usuario_id)
            values ($1, $2, $3, $4, $5, $6)
            returning id, email, nombre, apellido, telefono, tipo_usuario_id, colonia_id, activo, created_at, updated_at",
    types: &[
        Type::UUID,
        Type::VARCHAR,
        Type::VARCHAR,
        Type::VARCHAR,
        Type::VARCHAR,
        Type::INT2,
    ],
};

pub const JOIN_COMMUNITY: Sql = Sql {
    query: "update usuarios set colonia_id = $2, updated_at = now() where id = $1
            returning id, email, nombre, apellido, telefono, tipo_usuario_id, colonia_id, activo, created_at, updated_at",
    types: &[Type::UUID, Type::UUID],
};

pub const PROMOTE_TO_ADMIN: Sql = Sql {
    query: "update usuarios set colonia_id = $2, tipo_usuario_id = $3, updated_at = now() where id = $1",
    types: &[Type::UUID, Type::UUID, Type::INT2],
};

pub const GET_COMMUNITY: Sql = Sql {
    query: "select id, nombre, direccion, admin_principal_id, created_at, updated_at
            from colonias where id = $1",
    types: &[Type::UUID],
};

pub const LIST_COMMUNITIES: Sql = Sql {
    query: "select id, nombre, direccion, admin_principal_id, created_at, updated_at
            from colonias order by nombre",
    types: &[],
};

pub const CREATE_COMMUNITY: Sql = Sql {
    query: "insert into colonias (id, nombre, direccion, admin_principal_id) values ($1, $2, $3, $4)
            returning id, nombre, direccion, admin_principal_id, created_at, updated_at",
    types: &[Type::UUID, Type::VARCHAR, Type::VARCHAR, Type::UUID],
};

pub const GET_RESIDENCE: Sql = Sql {
    query: "select id, numero, calle, referencia, colonia_id, created_at, updated_at
            from residencias where id = $1",
    types: &[Type::UUID],
};

pub const FIND_RESIDENCES: Sql = Sql {
    query: "select id, numero, calle, referencia, colonia_id, created_at, updated_at
            from residencias where id = any($1)
            order by calle, length(numero), numero",
    types: &[Type::UUID_ARRAY],
};

pub const LIST_COMMUNITY_RESIDENCES: Sql = Sql {
    query: "select id, numero, calle, referencia, colonia_id, created_at, updated_at
            from residencias where colonia_id = $1
            order by calle, length(numero), numero",
    types: &[Type::UUID],
};

pub const CREATE_RESIDENCE: Sql = Sql {
    query: "insert into residencias (id, numero, calle, referencia, colonia_id) values ($1, $2, $3, $4, $5)
            returning id, numero, calle, referencia, colonia_id, created_at, updated_at",
    types: &[
        Type::UUID,
        Type::VARCHAR,
        Type::VARCHAR,
        Type::VARCHAR,
        Type::UUID,
    ],
};

pub const COUNT_ASSOCIATIONS: Sql = Sql {
    query: "select count(*) as total from residencias_usuarios where residencia_id = $1",
    types: &[Type::UUID],
};

pub const FIND_ASSOCIATION: Sql = Sql {
    query: "select id, usuario_id, residencia_id, rol, es_principal, verificado, created_at, updated_at
            from residencias_usuarios where usuario_id = $1 and residencia_id = $2",
    types: &[Type::UUID, Type::UUID],
};

pub const CREATE_ASSOCIATION: Sql = Sql {
    query: "insert into residencias_usuarios (id, usuario_id, residencia_id, rol, es_principal, verificado)
            values ($1, $2, $3, $4, $5, $6)
            returning id, usuario_id, residencia_id, rol, es_principal, verificado, created_at, updated_at",
    types: &[
        Type::UUID,
        Type::UUID,
        Type::UUID,
        Type::VARCHAR,
        Type::BOOL,
        Type::BOOL,
    ],
};

pub const RESIDENCE_ASSOCIATIONS: Sql = Sql {
    query: "select id, usuario_id, residencia_id, rol, es_principal, verificado, created_at, updated_at
            from residencias_usuarios where residencia_id = $1 order by created_at",
    types: &[Type::UUID],
};

pub const PROFILE_ASSOCIATIONS: Sql = Sql {
    query: "select id, usuario_id, residencia_id, rol, es_principal, verificado, created_at, updated_at
            from residencias_usuarios where usuario_id = $1 order by created_at",
    types: &[Type::UUID],
};

pub const VERIFY_ASSOCIATION: Sql = Sql {
    query: "update residencias_usuarios
            set verificado = true,
                updated_at = case when verificado then updated_at else now() end
            where usuario_id = $1 and residencia_id = $2
            returning id, usuario_id, residencia_id, rol, es_principal, verificado, created_at, updated_at",
    types: &[Type::UUID, Type::UUID],
};

pub const CREATE_VISIT: Sql = Sql {
    query: "insert into visitas (id, nombre_visitante, apellido_visitante, identificacion, tipo, fecha_programada, residencia_id, usuario_id, activa)
            values ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            returning id, nombre_visitante, apellido_visitante, identificacion, tipo, fecha_programada, residencia_id, usuario_id, activa, created_at, updated_at",
    types: &[
        Type::UUID,
        Type::VARCHAR,
        Type::VARCHAR,
        Type::VARCHAR,
        Type::VARCHAR,
        Type::TIMESTAMPTZ,
        Type::UUID,
        Type::UUID,
        Type::BOOL,
    ],
};

pub const GET_VISIT: Sql = Sql {
    query: "select id, nombre_visitante, apellido_visitante, identificacion, tipo, fecha_programada, residencia_id, usuario_id, activa, created_at, updated_at
            from visitas where id = $1",
    types: &[Type::UUID],
};

pub const LIST_RESIDENCE_VISITS: Sql = Sql {
    query: "select id, nombre_visitante, apellido_visitante, identificacion, tipo, fecha_programada, residencia_id, usuario_id, activa, created_at, updated_at
            from visitas where residencia_id = $1 order by fecha_programada desc",
    types: &[Type::UUID],
};

pub const SET_VISIT_ACTIVE: Sql = Sql {
    query: "update visitas set activa = $2, updated_at = now() where id = $1
            returning id, nombre_visitante, apellido_visitante, identificacion, tipo, fecha_programada, residencia_id, usuario_id, activa, created_at, updated_at",
    types: &[Type::UUID, Type::BOOL],
};

pub const CREATE_ANNOUNCEMENT: Sql = Sql {
    query: "insert into anuncios (id, titulo, contenido, usuario_id, colonia_id, importante, fecha_expiracion)
            values ($1, $2, $3, $4, $5, $6, $7)
            returning id, titulo, contenido, usuario_id, colonia_id, importante, fecha_publicacion, fecha_expiracion, created_at, updated_at",
    types: &[
        Type::UUID,
        Type::VARCHAR,
        Type::VARCHAR,
        Type::UUID,
        Type::UUID,
        Type::BOOL,
        Type::TIMESTAMPTZ,
    ],
};

pub const LIST_ACTIVE_ANNOUNCEMENTS: Sql = Sql {
    query: "select id, titulo, contenido, usuario_id, colonia_id, importante, fecha_publicacion, fecha_expiracion, created_at, updated_at
            from anuncios
            where colonia_id = $1 and (fecha_expiracion is null or fecha_expiracion > $2)
            order by importante desc, fecha_publicacion desc",
    types: &[Type::UUID, Type::TIMESTAMPTZ],
};

pub const GET_ANNOUNCEMENT: Sql = Sql {
    query: "select id, titulo, contenido, usuario_id, colonia_id, importante, fecha_publicacion, fecha_expiracion, created_at, updated_at
            from anuncios where id = $1",
    types: &[Type::UUID],
};

pub const UPDATE_ANNOUNCEMENT: Sql = Sql {
    query: "update anuncios
            set titulo = coalesce($2, titulo),
                contenido = coalesce($3, contenido),
                importante = coalesce($4, importante),
                fecha_expiracion = coalesce($5, fecha_expiracion),
                updated_at = now()
            where id = $1
            returning id, titulo, contenido, usuario_id, colonia_id, importante, fecha_publicacion, fecha_expiracion, created_at, updated_at",
    types: &[
        Type::UUID,
        Type::VARCHAR,
        Type::VARCHAR,
        Type::BOOL,
        Type::TIMESTAMPTZ,
    ],
};

pub const DELETE_ANNOUNCEMENT: Sql = Sql {
    query: "delete from anuncios where id = $1
            returning id, titulo, contenido, usuario_id, colonia_id, importante, fecha_publicacion, fecha_expiracion, created_at, updated_at",
    types: &[Type::UUID],
};
